use std::rc::Rc;

use dogs::data_structures::sparse_set::SparseSet;
use fastrand::Rng;

use crate::color::{Solution, VertexId};
use crate::instance::Instance;

/** Incremental state of an equitable k-coloring.

Maintains the coloring together with per-class sizes, per-vertex conflict
counters, the set of conflicting vertices and the number of conflicting
edges, all updated in O(deg) per move. Class sizes stay within
{⌊n/k⌋, ⌊n/k⌋+1} after construction and after every transfer or exchange.
*/
#[derive(Debug)]
pub struct EqColState {
    /// reference instance
    inst: Rc<Instance>,
    /// number of color classes
    k: usize,
    /// colors[v]: color of the vertex v (None during construction only)
    colors: Vec<Option<usize>>,
    /// class_sizes[c]: number of vertices colored c
    class_sizes: Vec<usize>,
    /// conflicts[v]: number of neighbors of v sharing its color
    conflicts: Vec<i64>,
    /// vertices that have some conflict
    conflicting_vertices: SparseSet,
    /// number of conflicting edges
    obj: i64,
    /// smallest allowed class size (⌊n/k⌋)
    floor_size: usize,
    /// largest allowed class size (⌊n/k⌋+1)
    big_size: usize,
    /// target number of classes of size big_size (r = n - k.⌊n/k⌋)
    nb_big_target: usize,
}

impl EqColState {

    /** creates an empty state for the given instance and number of colors */
    pub fn new(inst:Rc<Instance>, k:usize) -> Self {
        assert!(k >= 1);
        let n = inst.nb_vertices();
        let floor_size = n / k;
        Self {
            inst,
            k,
            colors: vec![None ; n],
            class_sizes: vec![0 ; k],
            conflicts: vec![0 ; n],
            conflicting_vertices: SparseSet::new(n),
            obj: 0,
            floor_size,
            big_size: floor_size + 1,
            nb_big_target: n - k*floor_size,
        }
    }

    /** colors every vertex greedily in a shuffled order.

    Each vertex goes to the smallest-indexed class that accepts more
    vertices and creates no new conflict; if every admissible class
    conflicts, a random admissible class is used. The cap on class sizes
    switches from ⌊n/k⌋+1 to ⌊n/k⌋ once r classes reached the larger size,
    so the result is always equitable.
    */
    pub fn construct_greedy_initial(&mut self, rng:&mut Rng) {
        let n = self.inst.nb_vertices();
        self.colors.fill(None);
        self.class_sizes.fill(0);
        self.conflicts.fill(0);
        self.conflicting_vertices = SparseSet::new(n);
        self.obj = 0;
        let mut vertices:Vec<VertexId> = (0..n).collect();
        rng.shuffle(&mut vertices);
        self.greedy_assign(&vertices, rng);
    }

    /** builds a state with one color less than `prev`, reusing its coloring.

    A random color is dropped and the surviving classes are renumbered.
    Conflict counters and the objective are inherited rather than recomputed:
    only the edges lying inside the removed class leave the objective (counted
    once via the v<u convention). The orphaned vertices are then colored by
    the greedy procedure, which may introduce new conflicts for the tabu
    search to repair.
    */
    pub fn from_previous(prev:&EqColState, rng:&mut Rng) -> EqColState {
        debug_assert!(prev.k >= 2);
        let prev_k = prev.k;
        let mut state = EqColState::new(prev.inst.clone(), prev_k - 1);
        let n = prev.inst.nb_vertices();
        // draw the color to remove, remap the survivors to [0, k-1)
        let mut perm:Vec<usize> = (0..prev_k).collect();
        rng.shuffle(&mut perm);
        let removed_color = perm[prev_k-1];
        let mut color_map = vec![None ; prev_k];
        for (target,&c) in perm[..prev_k-1].iter().enumerate() {
            color_map[c] = Some(target);
        }
        let mut uncolored:Vec<VertexId> = Vec::with_capacity(prev.big_size);
        for v in 0..n {
            match prev.colors[v] {
                Some(c) if c == removed_color => uncolored.push(v),
                Some(c) => {
                    let c_new = color_map[c].unwrap();
                    state.colors[v] = Some(c_new);
                    state.class_sizes[c_new] += 1;
                }
                None => uncolored.push(v),
            }
        }
        // inherit the conflict bookkeeping; edges inside the removed class disappear
        state.obj = prev.obj;
        for v in 0..n {
            if prev.colors[v] == Some(removed_color) {
                for &u in prev.inst.neighbors(v) {
                    if u > v && prev.colors[u] == Some(removed_color) {
                        state.obj -= 1;
                    }
                }
            } else if state.colors[v].is_some() {
                state.conflicts[v] = prev.conflicts[v];
                if state.conflicts[v] > 0 {
                    state.conflicting_vertices.insert(v);
                }
            }
        }
        // color the orphaned vertices
        rng.shuffle(&mut uncolored);
        state.greedy_assign(&uncolored, rng);
        state
    }

    /// greedy coloring of `vertices` under the equity cap
    fn greedy_assign(&mut self, vertices:&[VertexId], rng:&mut Rng) {
        let mut nb_big = (0..self.k).filter(|&c| self.class_sizes[c] >= self.big_size).count();
        let mut candidates:Vec<usize> = Vec::with_capacity(self.k);
        for &v in vertices {
            let cap = if nb_big < self.nb_big_target { self.big_size } else { self.floor_size };
            candidates.clear();
            for c in 0..self.k {
                if self.class_sizes[c] < cap {
                    candidates.push(c);
                }
            }
            let conflict_free = candidates.iter().cloned()
                .find(|&c| self.inst.neighbors(v).iter().all(|&u| self.colors[u] != Some(c)));
            let chosen = match conflict_free {
                Some(c) => c,
                None if candidates.is_empty() => {
                    // degenerate case: fall back to the least filled class
                    (0..self.k).min_by_key(|&c| self.class_sizes[c]).unwrap()
                }
                None => candidates[rng.usize(0..candidates.len())],
            };
            self.assign(v, chosen);
            if self.class_sizes[chosen] == self.big_size {
                nb_big += 1;
            }
        }
    }

    /// assigns color c to the uncolored vertex v, updating conflicts incrementally
    fn assign(&mut self, v:VertexId, c:usize) {
        debug_assert!(self.colors[v].is_none());
        let inst = self.inst.clone();
        self.colors[v] = Some(c);
        self.class_sizes[c] += 1;
        for &u in inst.neighbors(v) {
            if self.colors[u] == Some(c) {
                self.obj += 1;
                self.conflicts[v] += 1;
                self.conflicts[u] += 1;
                if !self.conflicting_vertices.contains(v) { self.conflicting_vertices.insert(v); }
                if !self.conflicting_vertices.contains(u) { self.conflicting_vertices.insert(u); }
            }
        }
    }

    /** change in the number of conflicting edges if v moved from c_prev to c_next.
    O(deg(v)); uncolored neighbors are ignored. */
    pub fn get_move_delta(&self, v:VertexId, c_prev:usize, c_next:usize) -> i64 {
        let mut delta = 0;
        for &u in self.inst.neighbors(v) {
            match self.colors[u] {
                Some(c) if c == c_prev => delta -= 1,
                Some(c) if c == c_next => delta += 1,
                _ => {}
            }
        }
        delta
    }

    /** change in the number of conflicting edges if v and u exchanged their
    (distinct) colors. O(deg(v)+deg(u)); the edge (v,u) itself contributes
    nothing since the endpoints stay in distinct classes. */
    pub fn get_swap_delta(&self, v:VertexId, u:VertexId) -> i64 {
        let c_v = self.colors[v];
        let c_u = self.colors[u];
        if c_v == c_u { return 0; }
        let mut delta = 0;
        for &w in self.inst.neighbors(v) {
            if w == u { continue; }
            if self.colors[w] == c_v { delta -= 1; }
            else if self.colors[w] == c_u { delta += 1; }
        }
        for &w in self.inst.neighbors(u) {
            if w == v { continue; }
            if self.colors[w] == c_u { delta -= 1; }
            else if self.colors[w] == c_v { delta += 1; }
        }
        delta
    }

    /** recolors v with c_next, maintaining class sizes, conflict counters,
    the conflicting-vertex set and the objective. */
    pub fn apply_move(&mut self, v:VertexId, c_next:usize) {
        let inst = self.inst.clone();
        let c_prev = self.colors[v].unwrap();
        self.colors[v] = Some(c_next);
        self.class_sizes[c_prev] -= 1;
        self.class_sizes[c_next] += 1;
        // conflicts leaving with the previous color
        for &u in inst.neighbors(v) {
            if self.colors[u] == Some(c_prev) {
                self.obj -= 1;
                self.conflicts[v] -= 1;
                self.conflicts[u] -= 1;
                if self.conflicts[v] == 0 && self.conflicting_vertices.contains(v) { self.conflicting_vertices.remove(v); }
                if self.conflicts[u] == 0 && self.conflicting_vertices.contains(u) { self.conflicting_vertices.remove(u); }
            }
        }
        // conflicts entering with the new color
        for &u in inst.neighbors(v) {
            if self.colors[u] == Some(c_next) {
                self.obj += 1;
                self.conflicts[v] += 1;
                self.conflicts[u] += 1;
                if !self.conflicting_vertices.contains(v) { self.conflicting_vertices.insert(v); }
                if !self.conflicting_vertices.contains(u) { self.conflicting_vertices.insert(u); }
            }
        }
    }

    /** exchanges the colors of v and u as two sequential moves.
    Class sizes return to their pre-swap values; the intermediate imbalance
    between the two classes is never observable from outside. */
    pub fn apply_swap(&mut self, v:VertexId, u:VertexId) {
        let c_v = self.colors[v].unwrap();
        let c_u = self.colors[u].unwrap();
        self.apply_move(v, c_u);
        self.apply_move(u, c_v);
    }

    /// number of vertices of the instance
    pub fn nb_vertices(&self) -> usize { self.inst.nb_vertices() }

    /// number of color classes
    pub fn k(&self) -> usize { self.k }

    /// number of conflicting edges
    pub fn obj(&self) -> i64 { self.obj }

    /// true iff the state is a proper equitable coloring
    pub fn is_goal(&self) -> bool { self.obj == 0 }

    /// color of vertex v (None during construction only)
    pub fn color(&self, v:VertexId) -> Option<usize> { self.colors[v] }

    /// number of neighbors of v sharing its color
    pub fn nb_conflicts(&self, v:VertexId) -> i64 { self.conflicts[v] }

    /// number of vertices colored c
    pub fn class_size(&self, c:usize) -> usize { self.class_sizes[c] }

    /// smallest allowed class size
    pub fn floor_size(&self) -> usize { self.floor_size }

    /// largest allowed class size
    pub fn big_size(&self) -> usize { self.big_size }

    /// number of vertices with at least one conflict
    pub fn nb_conflicting(&self) -> usize { self.conflicting_vertices.len() }

    /// i-th conflicting vertex (arbitrary but stable order between moves)
    pub fn conflicting_nth(&self, i:usize) -> VertexId { self.conflicting_vertices.nth(i) }

    /// true iff class sizes match the equity targets exactly
    pub fn is_equitable(&self) -> bool {
        let nb_big = self.class_sizes.iter().filter(|&&s| s == self.big_size).count();
        self.class_sizes.iter().all(|&s| s == self.floor_size || s == self.big_size)
            && nb_big == self.nb_big_target
    }

    /// builds the partition representation of the coloring
    pub fn solution(&self) -> Solution {
        let mut sol:Solution = vec![vec![] ; self.k];
        for (v,c) in self.colors.iter().enumerate() {
            sol[c.unwrap()].push(v);
        }
        sol
    }

    /** recomputes the objective from scratch (slow, for checks only) */
    pub fn recompute_objective_slow(&self) -> i64 {
        let mut sum = 0;
        for v in self.inst.vertices() {
            for &u in self.inst.neighbors(v) {
                if self.colors[v].is_some() && self.colors[v] == self.colors[u] {
                    sum += 1;
                }
            }
        }
        sum / 2
    }

    /** full recomputation of every incremental structure, compared against
    the maintained values. Slow; used by tests and debug checks. */
    pub fn validate_consistency(&self) -> bool {
        let n = self.inst.nb_vertices();
        // colors within range & class sizes
        let mut sizes = vec![0 ; self.k];
        for v in 0..n {
            match self.colors[v] {
                Some(c) if c < self.k => sizes[c] += 1,
                _ => return false,
            }
        }
        if sizes != self.class_sizes { return false; }
        // conflict counters
        for v in 0..n {
            let count = self.inst.neighbors(v).iter()
                .filter(|&&u| self.colors[u] == self.colors[v]).count() as i64;
            if count != self.conflicts[v] { return false; }
        }
        // objective
        if self.obj != self.recompute_objective_slow() { return false; }
        // conflicting vertex set
        let mut marked = vec![false ; n];
        for i in 0..self.conflicting_vertices.len() {
            let v = self.conflicting_vertices.nth(i);
            if marked[v] { return false; }
            marked[v] = true;
        }
        (0..n).all(|v| marked[v] == (self.conflicts[v] > 0))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn random_instance(n:usize, p:f64, seed:u64) -> Rc<Instance> {
        let mut rng = Rng::with_seed(seed);
        let mut edges = Vec::new();
        for v in 0..n {
            for u in (v+1)..n {
                if rng.f64() < p {
                    edges.push((v,u));
                }
            }
        }
        Rc::new(Instance::new(n, edges).unwrap())
    }

    fn greedy_state(inst:Rc<Instance>, k:usize, seed:u64) -> EqColState {
        let mut state = EqColState::new(inst, k);
        let mut rng = Rng::with_seed(seed);
        state.construct_greedy_initial(&mut rng);
        state
    }

    #[test]
    fn test_greedy_initial_is_equitable() {
        let inst = random_instance(30, 0.2, 0);
        let state = greedy_state(inst, 7, 0);
        assert!(state.validate_consistency());
        assert!(state.is_equitable());
        // 30 = 7*4 + 2: two classes of size 5, five classes of size 4
        assert_eq!(state.floor_size(), 4);
        assert_eq!((0..7).filter(|&c| state.class_size(c) == 5).count(), 2);
    }

    #[test]
    fn test_greedy_initial_edgeless_graph() {
        let inst = Rc::new(Instance::new(6, vec![]).unwrap());
        let state = greedy_state(inst, 1, 0);
        assert!(state.is_goal());
        assert!(state.is_equitable());
        assert_eq!(state.class_size(0), 6);
    }

    #[test]
    fn test_move_delta_matches_apply() {
        let inst = random_instance(25, 0.3, 1);
        let mut state = greedy_state(inst, 5, 1);
        let mut rng = Rng::with_seed(99);
        for _ in 0..200 {
            let v = rng.usize(0..25);
            let c_prev = state.color(v).unwrap();
            let c_next = (c_prev + 1 + rng.usize(0..4)) % 5;
            let delta = state.get_move_delta(v, c_prev, c_next);
            let obj_before = state.obj();
            state.apply_move(v, c_next);
            assert_eq!(state.obj(), obj_before + delta);
            assert!(state.validate_consistency());
        }
    }

    #[test]
    fn test_swap_delta_matches_apply() {
        let inst = random_instance(25, 0.3, 2);
        let mut state = greedy_state(inst, 5, 2);
        let mut rng = Rng::with_seed(7);
        for _ in 0..200 {
            let v = rng.usize(0..25);
            let u = rng.usize(0..25);
            if v == u || state.color(v) == state.color(u) { continue; }
            let delta = state.get_swap_delta(v, u);
            let obj_before = state.obj();
            state.apply_swap(v, u);
            assert_eq!(state.obj(), obj_before + delta);
            assert!(state.validate_consistency());
            assert!(state.is_equitable());
        }
    }

    fn snapshot(state:&EqColState) -> (Vec<Option<usize>>, Vec<usize>, i64, usize) {
        let colors = (0..state.nb_vertices()).map(|v| state.color(v)).collect();
        let sizes = (0..state.k()).map(|c| state.class_size(c)).collect();
        (colors, sizes, state.obj(), state.nb_conflicting())
    }

    #[test]
    fn test_move_roundtrip_restores_state() {
        let inst = random_instance(20, 0.3, 3);
        let mut state = greedy_state(inst, 4, 3);
        let before = snapshot(&state);
        let c_prev = state.color(11).unwrap();
        let c_next = (c_prev + 1) % 4;
        state.apply_move(11, c_next);
        state.apply_move(11, c_prev);
        assert_eq!(snapshot(&state), before);
        assert!(state.validate_consistency());
    }

    #[test]
    fn test_swap_twice_is_identity() {
        let inst = random_instance(20, 0.3, 4);
        let mut state = greedy_state(inst, 4, 4);
        let v = 3;
        let u = (0..20).find(|&u| state.color(u) != state.color(v)).unwrap();
        let before = snapshot(&state);
        state.apply_swap(v, u);
        state.apply_swap(v, u);
        assert_eq!(snapshot(&state), before);
        assert!(state.validate_consistency());
    }

    #[test]
    fn test_from_previous_decrements_k_and_keeps_equity() {
        let inst = random_instance(33, 0.25, 5);
        let prev = greedy_state(inst, 8, 5);
        let mut rng = Rng::with_seed(5);
        let state = EqColState::from_previous(&prev, &mut rng);
        assert_eq!(state.k(), 7);
        assert!(state.validate_consistency());
        assert!(state.is_equitable());
    }

    #[test]
    fn test_from_previous_from_conflicted_state() {
        // a k too small for a proper coloring: the warm start must still
        // inherit the objective bookkeeping exactly
        let inst = random_instance(20, 0.5, 6);
        let prev = greedy_state(inst, 3, 6);
        assert!(prev.obj() > 0);
        let mut rng = Rng::with_seed(6);
        let state = EqColState::from_previous(&prev, &mut rng);
        assert_eq!(state.k(), 2);
        assert!(state.validate_consistency());
        assert!(state.is_equitable());
    }
}
