use dogs::search_algorithm::StoppingCriterion;
use fastrand::Rng;

use crate::color::VertexId;
use crate::search::state::EqColState;

/** parameters of the tabu search */
#[derive(Debug,Clone)]
pub struct TabuParams {
    /// tenure multiplier on the number of conflicting vertices
    pub alpha: f64,
    /// tenure random span (inclusive upper bound)
    pub beta: i64,
    /// accept tabu moves that improve on the best objective of the run
    pub aspiration: bool,
    /// iteration cap of one run
    pub max_iter: i64,
    /// iterations without improvement before a perturbation
    pub perturbation_limit: i64,
    /// fraction of the vertices swapped during a perturbation
    pub perturbation_strength: f64,
}

impl Default for TabuParams {
    fn default() -> Self {
        Self {
            alpha: 0.6,
            beta: 10,
            aspiration: true,
            max_iter: 1_000_000,
            perturbation_limit: 1000,
            perturbation_strength: 0.16,
        }
    }
}

/** outcome of one tabu run at a fixed number of colors */
#[derive(Debug,Clone)]
pub struct TabuResult {
    /// true iff the run reached a conflict-free coloring
    pub solved: bool,
    /// number of iterations performed
    pub nb_iter: i64,
    /// objective when the run stopped
    pub final_obj: i64,
}

/**
Decision of recoloring: either transfer a vertex of a large class into a
small class, or exchange the colors of two vertices.
*/
#[derive(Debug,Clone,Copy,Eq,PartialEq)]
pub enum Decision {
    /// move v into the class c_next
    Transfer {
        /// vertex to recolor
        v: VertexId,
        /// destination class
        c_next: usize,
    },
    /// exchange the colors of v and u
    Exchange {
        /// first vertex (conflicting)
        v: VertexId,
        /// second vertex
        u: VertexId,
    },
}

/** tabu memory over (vertex, color) assignments.

`until[v.k + c]` holds an iteration threshold: re-assigning color c to
vertex v is forbidden at every iteration strictly below it. Stored as a
flat row-major array. */
#[derive(Debug)]
pub struct TabuTable {
    /// number of colors (row width)
    k: usize,
    /// until[v*k+c]: first iteration at which v may take color c again
    until: Vec<i64>,
}

impl TabuTable {
    /** creates an all-free table for n vertices and k colors */
    pub fn new(n:usize, k:usize) -> Self {
        Self { k, until: vec![0 ; n*k] }
    }

    /// frees every entry (used after a perturbation)
    pub fn reset(&mut self) {
        self.until.fill(0);
    }

    /// forbids assigning color c to vertex v before iteration `until`
    pub fn forbid(&mut self, v:VertexId, c:usize, until:i64) {
        self.until[v*self.k + c] = until;
    }

    /// true iff assigning color c to vertex v is tabu at iteration nb_iter
    pub fn is_tabu(&self, v:VertexId, c:usize, nb_iter:i64) -> bool {
        self.until[v*self.k + c] > nb_iter
    }
}


/** runs the TabuEQCol search on `state` until it reaches a conflict-free
coloring, the iteration cap, an empty admissible neighborhood, or the
stopping criterion.

Each iteration scans the full neighborhood (transfers from large to small
classes when n mod k ≠ 0, then color exchanges under the anti-symmetry
rule), keeps the pool of best-delta candidates surviving the
tabu/aspiration filter, applies one of them uniformly at random and writes
the tenure entries for the reverse assignments. A perturbation of random
swaps fires after `perturbation_limit` non-improving iterations.
*/
pub fn tabu_eqcol<Stopping:StoppingCriterion>(
    state:&mut EqColState,
    params:&TabuParams,
    stop:&Stopping,
    rng:&mut Rng,
) -> TabuResult {
    if state.is_goal() {
        return TabuResult { solved:true, nb_iter:0, final_obj:0 };
    }
    let n = state.nb_vertices();
    let k = state.k();
    let mut tabu = TabuTable::new(n, k);
    let mut best_obj = state.obj();
    let mut nb_iter:i64 = 0;
    let mut no_improve:i64 = 0;
    let mut pool:Vec<Decision> = Vec::new();
    while nb_iter < params.max_iter && !state.is_goal() {
        if nb_iter % 128 == 0 && stop.is_finished() {
            break;
        }
        if no_improve >= params.perturbation_limit && params.perturbation_strength > 0. {
            perturb(state, params.perturbation_strength, rng);
            tabu.reset();
            no_improve = 0;
            nb_iter += 1;
            continue;
        }
        // evaluate the neighborhood, pooling the best-delta candidates
        let mut best_delta = i64::MAX;
        pool.clear();
        // transfers: only when class sizes actually differ
        if n % k != 0 {
            for i in 0..state.nb_conflicting() {
                let v = state.conflicting_nth(i);
                let c_v = state.color(v).unwrap();
                if state.class_size(c_v) != state.big_size() { continue; }
                for j in 0..k {
                    if state.class_size(j) != state.floor_size() { continue; }
                    let delta = state.get_move_delta(v, c_v, j);
                    let tabu_hit = tabu.is_tabu(v, j, nb_iter);
                    let aspirated = params.aspiration && state.obj() + delta < best_obj;
                    if tabu_hit && !aspirated { continue; }
                    if delta < best_delta {
                        best_delta = delta;
                        pool.clear();
                        pool.push(Decision::Transfer { v, c_next:j });
                    } else if delta == best_delta {
                        pool.push(Decision::Transfer { v, c_next:j });
                    }
                }
            }
        }
        // exchanges: v conflicting, u of another color; when u is also
        // conflicting, only the pair with color(u) < color(v) is evaluated
        for i in 0..state.nb_conflicting() {
            let v = state.conflicting_nth(i);
            let c_v = state.color(v).unwrap();
            for u in 0..n {
                if u == v { continue; }
                let c_u = state.color(u).unwrap();
                if c_u == c_v { continue; }
                if state.nb_conflicts(u) > 0 && c_u > c_v { continue; }
                let delta = state.get_swap_delta(v, u);
                let tabu_hit = tabu.is_tabu(v, c_u, nb_iter) || tabu.is_tabu(u, c_v, nb_iter);
                let aspirated = params.aspiration && state.obj() + delta < best_obj;
                if tabu_hit && !aspirated { continue; }
                if delta < best_delta {
                    best_delta = delta;
                    pool.clear();
                    pool.push(Decision::Exchange { v, u });
                } else if delta == best_delta {
                    pool.push(Decision::Exchange { v, u });
                }
            }
        }
        if pool.is_empty() {
            // every admissible move is tabu without aspiration
            break;
        }
        // apply one of the tied best candidates, then write the tenure
        // entries forbidding the reverse assignments
        let chosen = pool[rng.usize(0..pool.len())];
        let tenure = (params.alpha * state.nb_conflicting() as f64) as i64
            + rng.i64(0..=params.beta);
        match chosen {
            Decision::Transfer { v, c_next } => {
                let c_prev = state.color(v).unwrap();
                state.apply_move(v, c_next);
                tabu.forbid(v, c_prev, nb_iter + tenure);
            }
            Decision::Exchange { v, u } => {
                let c_v = state.color(v).unwrap();
                let c_u = state.color(u).unwrap();
                state.apply_swap(v, u);
                tabu.forbid(v, c_v, nb_iter + tenure);
                tabu.forbid(u, c_u, nb_iter + tenure);
            }
        }
        if state.obj() < best_obj {
            best_obj = state.obj();
            no_improve = 0;
        } else {
            no_improve += 1;
        }
        nb_iter += 1;
    }
    TabuResult { solved: state.is_goal(), nb_iter, final_obj: state.obj() }
}

/// random swaps of vertex pairs with distinct colors (equity preserving)
fn perturb(state:&mut EqColState, strength:f64, rng:&mut Rng) {
    let n = state.nb_vertices();
    let nb_draws = (strength * n as f64) as usize;
    for _ in 0..nb_draws {
        let v = rng.usize(0..n);
        let u = rng.usize(0..n);
        if v != u && state.color(v) != state.color(u) {
            state.apply_swap(v, u);
        }
    }
}
