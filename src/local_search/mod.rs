//! Local search operators for candidate solutions.
//!
//! Cross-route operators (interchanges, tail exchange, relocate, exchange)
//! run first, each family driven to quiescence under a sweep cap; the
//! per-route pass then reorders every route, exactly for small routes and
//! heuristically for larger ones. Every move is accepted greedily on first
//! improvement.

pub mod exact;
pub mod exchange;
pub mod interchange;
pub mod intra;
pub mod relocate;
pub mod segment_swap;

use std::cmp::Ordering;

use crate::evaluation::{compare_duration_pair, replay_route};
use crate::problem::Problem;
use crate::solution::Solution;

/// Runs the improvement passes over one finalized candidate solution.
pub struct LocalSearch {
    /// Cap on full sweeps per operator family.
    pub max_sweeps: usize,
}

impl LocalSearch {
    pub fn new(max_sweeps: usize) -> Self {
        LocalSearch { max_sweeps }
    }

    /// Improve a finalized candidate in place.
    ///
    /// Expects depot-terminated routes (idle couriers may sit at `[depot]`);
    /// leaves idle couriers at `[depot]` on return.
    pub fn improve(&self, solution: &mut Solution, problem: &Problem) {
        debug_assert_eq!(solution.routes.len(), problem.num_couriers());
        for route in &mut solution.routes {
            debug_assert!(!route.is_empty());
            if route.len() == 1 {
                route.push(0);
            }
        }

        for _ in 0..self.max_sweeps {
            if !self.interchange_1_2(solution, problem) {
                break;
            }
        }
        for _ in 0..self.max_sweeps {
            if !self.segment_swap(solution, problem) {
                break;
            }
        }
        for _ in 0..self.max_sweeps {
            if !self.relocate_pass(solution, problem) {
                break;
            }
        }
        for _ in 0..self.max_sweeps {
            if !self.exchange_pass(solution, problem) {
                break;
            }
        }
        for _ in 0..self.max_sweeps {
            if !self.interchange_2_2(solution, problem) {
                break;
            }
        }
        for _ in 0..self.max_sweeps {
            if !self.interchange_0_2(solution, problem) {
                break;
            }
        }

        for k in 0..solution.routes.len() {
            if solution.routes[k].len() > 3 {
                self.optimize_route(solution, problem, k);
            } else if solution.routes[k].len() == 2 {
                solution.routes[k].pop();
            }
        }
    }

    /// Intra-route optimization, dispatched by route size.
    pub fn optimize_route(&self, solution: &mut Solution, problem: &Problem, k: usize) {
        let stops = solution.routes[k].len() - 2;
        if stops <= 8 {
            self.exact_reorder(solution, problem, k);
        } else {
            self.two_opt(solution, problem, k);
            for _ in 0..self.max_sweeps {
                if !self.one_opt_pass(solution, problem, k) {
                    break;
                }
            }
        }
    }

    /// Propose replacing routes `k` and `l`; commit when the two-tier
    /// acceptance rule holds.
    ///
    /// Accepts when the combined violation of the rebuilt routes strictly
    /// drops, or stays equal while the (worse, better) pair of normalized
    /// durations strictly improves. Infeasible rebuilds never pass.
    pub(crate) fn try_commit_pair(
        &self,
        solution: &mut Solution,
        problem: &Problem,
        k: usize,
        l: usize,
        new_k: Vec<usize>,
        new_l: Vec<usize>,
    ) -> bool {
        let state_k = replay_route(&new_k, &problem.couriers[k], k, problem);
        let state_l = replay_route(&new_l, &problem.couriers[l], l, problem);

        let old_violation = solution.states[k].violation + solution.states[l].violation;
        let new_violation = state_k.violation + state_l.violation;
        if new_violation > old_violation {
            return false;
        }
        if new_violation == old_violation {
            let speed_k = problem.couriers[k].speed;
            let speed_l = problem.couriers[l].speed;
            let old = (
                solution.states[k].norm_duration(speed_k),
                solution.states[l].norm_duration(speed_l),
            );
            let new = (
                state_k.norm_duration(speed_k),
                state_l.norm_duration(speed_l),
            );
            if compare_duration_pair(new, old) != Ordering::Less {
                return false;
            }
        }

        solution.routes[k] = new_k;
        solution.routes[l] = new_l;
        solution.states[k] = state_k;
        solution.states[l] = state_l;
        true
    }
}
