use std::rc::Rc;

use dogs::search_algorithm::StoppingCriterion;
use fastrand::Rng;

use crate::color::Solution;
use crate::instance::Instance;
use crate::search::state::EqColState;
use crate::search::tabu_eqcol::{tabu_eqcol, TabuParams};

/** outcome of a full descent run */
#[derive(Debug,Clone)]
pub struct DescentResult {
    /// number of colors of the first search (Δ+1 unless overridden)
    pub initial_k: usize,
    /// smallest number of colors proven feasible
    pub best_k: usize,
    /// tabu iterations accumulated over every k
    pub total_iterations: i64,
    /// coloring witnessing best_k
    pub solution: Solution,
}

/**
Runs the descent: search k₀ = Δ(G)+1 (Hajnal–Szemerédi guarantees a
solution exists there), then repeatedly remove one color, warm-start from
the last feasible coloring and search again. Stops on the first k the tabu
search cannot solve, on k = 1, or on expiry of the stopping criterion, and
reports the last feasible k with its coloring. k never increases and a
failed k is never retried.
*/
pub fn descent_eqcol<Stopping:StoppingCriterion>(
    inst:Rc<Instance>,
    params:&TabuParams,
    seed:u64,
    initial_k:Option<usize>,
    stop:&Stopping,
) -> DescentResult {
    let k_init = initial_k.unwrap_or_else(|| inst.max_degree() + 1);
    let mut current = EqColState::new(inst, k_init);
    let mut rng = Rng::with_seed(seed);
    current.construct_greedy_initial(&mut rng);
    let mut best_solution = current.solution();
    let mut best_k = k_init;
    let mut total_iterations:i64 = 0;
    while !stop.is_finished() {
        let mut search_rng = Rng::with_seed(seed);
        let result = tabu_eqcol(&mut current, params, stop, &mut search_rng);
        total_iterations += result.nb_iter;
        if !result.solved {
            break;
        }
        best_solution = current.solution();
        best_k = current.k();
        println!("k = {} solved ({} iterations)", best_k, result.nb_iter);
        if best_k == 1 {
            break;
        }
        let mut seed_rng = Rng::with_seed(seed);
        current = EqColState::from_previous(&current, &mut seed_rng);
    }
    DescentResult { initial_k:k_init, best_k, total_iterations, solution:best_solution }
}


#[cfg(test)]
mod tests {
    use super::*;

    use dogs::search_algorithm::{NeverStoppingCriterion, TimeStoppingCriterion};

    use crate::color::{checker, CheckerResult};

    fn run_descent(inst:Rc<Instance>, initial_k:Option<usize>, seed:u64) -> DescentResult {
        let stop = NeverStoppingCriterion::default();
        descent_eqcol(inst, &TabuParams::default(), seed, initial_k, &stop)
    }

    fn assert_valid(inst:&Instance, res:&DescentResult) {
        assert_eq!(checker(inst, &res.solution), CheckerResult::Ok(res.best_k));
    }

    #[test]
    fn test_complete_graph_k4() {
        let inst = Rc::new(Instance::new(4,
            vec![(0,1),(0,2),(0,3),(1,2),(1,3),(2,3)]).unwrap());
        let res = run_descent(inst.clone(), None, 0);
        assert_eq!(res.initial_k, 4);
        assert_eq!(res.best_k, 4);
        assert_valid(&inst, &res);
    }

    #[test]
    fn test_five_cycle() {
        // ⌈5/2⌉ adjacent vertices would share a class with 2 colors,
        // so the equitable chromatic number is 3
        let inst = Rc::new(Instance::new(5,
            vec![(0,1),(1,2),(2,3),(3,4),(0,4)]).unwrap());
        let res = run_descent(inst.clone(), None, 0);
        assert_eq!(res.initial_k, 3);
        assert_eq!(res.best_k, 3);
        assert_valid(&inst, &res);
    }

    #[test]
    fn test_path_on_four_vertices() {
        let inst = Rc::new(Instance::new(4, vec![(0,1),(1,2),(2,3)]).unwrap());
        let res = run_descent(inst.clone(), None, 0);
        assert_eq!(res.initial_k, 3);
        assert_eq!(res.best_k, 2);
        assert_valid(&inst, &res);
    }

    #[test]
    fn test_triangle_stops_at_three() {
        let inst = Rc::new(Instance::new(3, vec![(0,1),(1,2),(0,2)]).unwrap());
        let res = run_descent(inst.clone(), None, 0);
        assert_eq!(res.best_k, 3);
        assert_valid(&inst, &res);
    }

    #[test]
    fn test_two_disjoint_edges_from_forced_k() {
        let inst = Rc::new(Instance::new(4, vec![(0,1),(2,3)]).unwrap());
        let res = run_descent(inst.clone(), Some(3), 0);
        assert_eq!(res.initial_k, 3);
        assert_eq!(res.best_k, 2);
        assert_valid(&inst, &res);
    }

    #[test]
    fn test_empty_graph_descends_to_one() {
        let inst = Rc::new(Instance::new(6, vec![]).unwrap());
        let res = run_descent(inst.clone(), None, 0);
        assert_eq!(res.initial_k, 1);
        assert_eq!(res.best_k, 1);
        assert_eq!(res.total_iterations, 0);
        assert_valid(&inst, &res);
    }

    #[test]
    fn test_planted_five_partition() {
        // 5-partite G(50, 0.3) (edges across parts only) plus a clique on
        // one vertex per part: the clique forbids 4 colors, the parts give
        // an equitable 5-coloring with classes of size 10
        let mut rng = Rng::with_seed(42);
        let mut edges = Vec::new();
        for v in 0..50usize {
            for u in (v+1)..50 {
                if v % 5 != u % 5 && rng.f64() < 0.3 {
                    edges.push((v,u));
                }
            }
        }
        for v in 0..5usize {
            for u in (v+1)..5 {
                edges.push((v,u));
            }
        }
        let inst = Rc::new(Instance::new(50, edges).unwrap());
        let stop = TimeStoppingCriterion::new(120.);
        let res = descent_eqcol(inst.clone(), &TabuParams::default(), 42, None, &stop);
        assert_eq!(res.best_k, 5);
        assert_valid(&inst, &res);
        let sizes:Vec<usize> = res.solution.iter().map(|c| c.len()).collect();
        assert!(sizes.iter().all(|&s| s == 10));
    }
}
