use bit_set::BitSet;

use crate::instance::Instance;

/** Vertex Id */
pub type VertexId = usize;

/** Solution of an equitable coloring problem
(represented as a partition into color classes). */
pub type Solution = Vec<Vec<VertexId>>;


/** checker result.
Returns the solution value if correct,
otherwise, provide an explanation on why the solution is incorrect.
*/
#[derive(Clone,Debug,Eq,PartialEq)]
pub enum CheckerResult {
    /// solution is correct and provide its number of colors
    Ok(usize),
    /// a vertex is added twice in the solution
    VertexAddedTwice(VertexId),
    /// some vertex is not colored
    VertexNotColored(VertexId),
    /// conflicting edge
    ConflictingEdge(VertexId, VertexId),
    /// two class sizes differ by more than one (smallest, largest)
    UnbalancedClasses(usize, usize),
}

/**
checks that a solution is a proper equitable coloring:
every vertex colored exactly once, no monochromatic edge,
and class sizes pairwise differing by at most one.
*/
pub fn checker(inst:&Instance, sol:&[Vec<VertexId>]) -> CheckerResult {
    // check that all vertices are added exactly once
    let mut visited = BitSet::new();
    for c in sol {
        for v in c {
            if visited.contains(*v) {
                return CheckerResult::VertexAddedTwice(*v);
            }
            visited.insert(*v);
        }
    }
    if visited.len() != inst.nb_vertices() {
        for v in 0..inst.nb_vertices() {
            if !visited.contains(v) {
                return CheckerResult::VertexNotColored(v);
            }
        }
        panic!("checker: internal error");
    }
    // check conflicts
    for c in sol {
        for v1 in c {
            for v2 in c {
                if v1 < v2 && inst.are_adjacent(*v1, *v2) {
                    return CheckerResult::ConflictingEdge(*v1,*v2);
                }
            }
        }
    }
    // check the equity constraint
    let smallest = sol.iter().map(|c| c.len()).min().unwrap_or(0);
    let largest = sol.iter().map(|c| c.len()).max().unwrap_or(0);
    if largest > smallest+1 {
        return CheckerResult::UnbalancedClasses(smallest, largest);
    }
    // if ok: return the number of colors
    CheckerResult::Ok(sol.len())
}


#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Instance {
        Instance::new(3, vec![(0,1),(1,2),(0,2)]).unwrap()
    }

    #[test]
    fn test_checker_ok() {
        let inst = triangle();
        let sol:Solution = vec![vec![0], vec![1], vec![2]];
        assert_eq!(checker(&inst, &sol), CheckerResult::Ok(3));
    }

    #[test]
    fn test_checker_conflict() {
        let inst = triangle();
        let sol:Solution = vec![vec![0,1], vec![2]];
        assert_eq!(checker(&inst, &sol), CheckerResult::ConflictingEdge(0,1));
    }

    #[test]
    fn test_checker_missing_vertex() {
        let inst = triangle();
        let sol:Solution = vec![vec![0], vec![1]];
        assert_eq!(checker(&inst, &sol), CheckerResult::VertexNotColored(2));
    }

    #[test]
    fn test_checker_unbalanced() {
        let inst = Instance::new(4, vec![(0,1)]).unwrap();
        let sol:Solution = vec![vec![1,2,3], vec![0]];
        assert_eq!(checker(&inst, &sol), CheckerResult::UnbalancedClasses(1,3));
    }
}
