//! Exact reordering of small routes by depth-first branch and bound.

use crate::problem::Problem;
use crate::solution::{CourierState, Solution};

use super::LocalSearch;

/// Incumbent ordering of the exact search: violation, distance, then time.
type RouteScore = (i64, i64, i64);

struct ExactSearch<'a> {
    problem: &'a Problem,
    courier: usize,
    /// The stops to permute (the route without its depot endpoints).
    stops: Vec<usize>,
    dist_limit: i64,
    finish_time: i64,
    best: RouteScore,
    best_path: Vec<usize>,
    path: Vec<usize>,
    used: Vec<bool>,
}

impl LocalSearch {
    /// Replace route `k` with the best chain-respecting order, when one
    /// strictly better than the current traversal exists.
    ///
    /// Intended for small routes; the search enumerates permutations
    /// depth-first and prunes any prefix whose distance, time, or running
    /// score already fails against the incumbent.
    pub fn exact_reorder(&self, solution: &mut Solution, problem: &Problem, k: usize) {
        let route = &solution.routes[k];
        debug_assert!(route.len() >= 4);
        let courier = &problem.couriers[k];
        let state = solution.states[k];

        let mut search = ExactSearch {
            problem,
            courier: k,
            stops: route[1..route.len() - 1].to_vec(),
            dist_limit: courier.dist_limit,
            finish_time: courier.finish_time,
            best: (state.violation, state.dist, state.time),
            best_path: Vec::new(),
            path: Vec::with_capacity(route.len()),
            used: vec![false; problem.orders.len()],
        };
        search.path.push(0);
        search.used[0] = true;
        search.descend(0, 0, 0, courier.start_time);

        if !search.best_path.is_empty() {
            solution.states[k] = CourierState {
                violation: search.best.0,
                dist: search.best.1,
                time: search.best.2,
            };
            solution.routes[k] = search.best_path;
        }
    }
}

impl ExactSearch<'_> {
    fn descend(&mut self, last: usize, violation: i64, dist: i64, time: i64) {
        if self.path.len() == self.stops.len() + 1 {
            self.close(last, violation, dist, time);
            return;
        }

        for idx in 0..self.stops.len() {
            let stop = self.stops[idx];
            if self.used[stop] {
                continue;
            }
            if let Some(pred) = self.problem.orders[stop].predecessor {
                if !self.used[pred] {
                    continue;
                }
            }

            let next_time = (time + self.problem.travel_time(self.courier, last, stop))
                .max(self.problem.orders[stop].ready_time);
            let next_violation = if next_time > self.problem.orders[stop].deadline {
                violation + self.problem.orders[stop].priority
            } else {
                violation
            };
            let next_dist = dist + self.problem.distance(last, stop);

            if next_dist <= self.dist_limit
                && next_time <= self.finish_time
                && (next_violation, next_dist, next_time) < self.best
            {
                self.path.push(stop);
                self.used[stop] = true;
                self.descend(stop, next_violation, next_dist, next_time);
                self.used[stop] = false;
                self.path.pop();
            }
        }
    }

    /// Complete a full permutation with the depot return and score it.
    fn close(&mut self, last: usize, violation: i64, dist: i64, time: i64) {
        let dist = dist + self.problem.distance(last, 0);
        let time = (time + self.problem.travel_time(self.courier, last, 0))
            .max(self.problem.orders[0].ready_time);
        let violation = if time > self.problem.orders[0].deadline {
            violation + self.problem.orders[0].priority
        } else {
            violation
        };

        if dist <= self.dist_limit
            && time <= self.finish_time
            && (violation, dist, time) < self.best
        {
            self.best = (violation, dist, time);
            self.best_path = self.path.clone();
            self.best_path.push(0);
        }
    }
}
