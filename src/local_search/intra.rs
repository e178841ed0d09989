//! Heuristic intra-route reordering: 2-opt reversal and 1-opt shifts.

use crate::evaluation::replay_route;
use crate::problem::Problem;
use crate::solution::Solution;

use super::LocalSearch;

impl LocalSearch {
    /// Best-improvement segment reversal on route `k`, driven to quiescence
    /// under the sweep cap.
    ///
    /// A reversal segment never starts at or before the position of the
    /// segment end's chain predecessor; anything the pruning lets through is
    /// still re-validated by a full replay.
    pub fn two_opt(&self, solution: &mut Solution, problem: &Problem, k: usize) {
        let courier = &problem.couriers[k];
        let last = solution.routes[k].len() - 2;
        let mut route = solution.routes[k].clone();
        let mut best_state = solution.states[k];

        for _ in 0..self.max_sweeps {
            let mut sweep_route: Option<Vec<usize>> = None;
            let mut sweep_state = best_state;
            let mut min_start = 0usize;

            for j in 2..=last {
                if let Some(pred) = problem.orders[route[j]].predecessor {
                    for t in (0..j).rev() {
                        if route[t] == pred {
                            min_start = min_start.max(t);
                            break;
                        }
                    }
                }
                debug_assert!(min_start < j);

                for i in (min_start + 1..j).rev() {
                    let mut candidate = Vec::with_capacity(route.len());
                    candidate.extend_from_slice(&route[..i]);
                    candidate.extend(route[i..=j].iter().rev());
                    candidate.extend_from_slice(&route[j + 1..]);

                    let state = replay_route(&candidate, courier, k, problem);
                    if state.better_than(&sweep_state) {
                        sweep_state = state;
                        sweep_route = Some(candidate);
                    }
                }
            }

            match sweep_route {
                Some(improved) => {
                    route = improved;
                    best_state = sweep_state;
                }
                None => break,
            }
        }

        solution.routes[k] = route;
        solution.states[k] = best_state;
    }

    /// One 1-opt pass on route `k`: adjacent transposition plus bubble
    /// expansion in both directions, keeping the best replay found.
    ///
    /// Returns `true` when the route changed. Pairs linked by a direct
    /// chain edge are never transposed.
    pub fn one_opt_pass(&self, solution: &mut Solution, problem: &Problem, k: usize) -> bool {
        let courier = &problem.couriers[k];
        let last = solution.routes[k].len() - 2;
        let route = solution.routes[k].clone();
        let mut best_route = route.clone();
        let mut best_state = solution.states[k];
        let mut changed = false;

        for pos in 1..last {
            if problem.orders[route[pos + 1]].predecessor == Some(route[pos]) {
                continue;
            }
            let mut swapped = route.clone();
            swapped.swap(pos, pos + 1);
            let state = replay_route(&swapped, courier, k, problem);
            if state.better_than(&best_state) {
                best_state = state;
                best_route = swapped.clone();
                changed = true;
            }

            // Bubble the moved stop further forward.
            let mut forward = swapped.clone();
            for t in pos + 1..last {
                if problem.orders[forward[t + 1]].predecessor == Some(forward[t]) {
                    break;
                }
                forward.swap(t, t + 1);
                let state = replay_route(&forward, courier, k, problem);
                if state.better_than(&best_state) {
                    best_state = state;
                    best_route = forward.clone();
                    changed = true;
                }
            }

            // And backward, from the singly-swapped route.
            let mut backward = swapped;
            for t in (1..pos).rev() {
                if problem.orders[backward[t + 1]].predecessor == Some(backward[t]) {
                    break;
                }
                backward.swap(t, t + 1);
                let state = replay_route(&backward, courier, k, problem);
                if state.better_than(&best_state) {
                    best_state = state;
                    best_route = backward.clone();
                    changed = true;
                }
            }
        }

        solution.routes[k] = best_route;
        solution.states[k] = best_state;
        changed
    }
}
