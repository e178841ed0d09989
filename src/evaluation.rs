//! Feasibility checks and objective evaluation.
//!
//! All scoring goes through two pure functions: [`replay_route`] rebuilds a
//! single courier's state from scratch, [`evaluate_solution`] aggregates the
//! per-courier states into the lexicographic objective. The two orderings
//! used by the search are explicit comparator functions so they cannot be
//! mixed up: [`compare_objective`] for whole solutions and
//! [`compare_duration_pair`] for the two routes touched by a cross-route
//! move.

use std::cmp::Ordering;

use crate::problem::{Courier, Problem, INF};
use crate::solution::{CourierState, Objective, Solution};

/// Score a full solution: total violation, then worst normalized duration.
///
/// A solution that does not carry one state per courier scores as
/// infeasible.
pub fn evaluate_solution(solution: &Solution, problem: &Problem) -> Objective {
    if solution.states.len() != problem.num_couriers()
        || solution.routes.len() != problem.num_couriers()
    {
        return Objective::infeasible();
    }
    let mut violation: i64 = 0;
    let mut max_norm_duration: f64 = 0.0;
    for (state, courier) in solution.states.iter().zip(&problem.couriers) {
        violation = (violation + state.violation).min(INF);
        max_norm_duration = max_norm_duration.max(state.norm_duration(courier.speed));
    }
    Objective {
        violation,
        max_norm_duration,
    }
}

/// Replay a route from the courier's start state.
///
/// Enforces, hop by hop: the next stop's chain predecessor was already
/// visited in this replay, the courier is eligible for the hop's origin,
/// arrival waits for the stop's ready time, the courier's finish time and
/// distance limit hold (hard), and a missed deadline adds the stop's
/// priority to the violation counter (soft). A `[depot, depot]` route is
/// trivially empty. Any hard breach yields the infeasible sentinel state.
pub fn replay_route(
    route: &[usize],
    courier: &Courier,
    courier_idx: usize,
    problem: &Problem,
) -> CourierState {
    debug_assert!(!route.is_empty());
    if route.len() == 2 && route[1] == 0 {
        return CourierState::default();
    }

    let mut visited = vec![false; problem.orders.len()];
    visited[route[0]] = true;

    let mut time = courier.start_time;
    let mut dist: i64 = 0;
    let mut violation: i64 = 0;
    for hop in route.windows(2) {
        let (from, to) = (hop[0], hop[1]);
        if !problem.eligible[courier_idx][from] {
            return CourierState::infeasible();
        }
        if let Some(pred) = problem.orders[to].predecessor {
            if !visited[pred] {
                return CourierState::infeasible();
            }
        }
        time = (time + problem.travel_time(courier_idx, from, to)).max(problem.orders[to].ready_time);
        if time > courier.finish_time {
            return CourierState::infeasible();
        }
        if time > problem.orders[to].deadline {
            violation += problem.orders[to].priority;
        }
        dist += problem.distance(from, to);
        if dist > courier.dist_limit {
            return CourierState::infeasible();
        }
        visited[to] = true;
    }
    CourierState {
        dist,
        time,
        violation,
    }
}

/// Append the depot as the final stop of every non-empty route, accounting
/// the return leg.
///
/// Construction guarantees the return stays within the hard limits; debug
/// builds verify that.
pub fn append_depot_return(solution: &mut Solution, problem: &Problem) {
    for k in 0..solution.routes.len() {
        let route = &mut solution.routes[k];
        if route.len() <= 1 {
            continue;
        }
        let last = route[route.len() - 1];
        debug_assert_ne!(last, 0);
        route.push(0);

        let state = &mut solution.states[k];
        state.dist += problem.distance(last, 0);
        let time =
            (state.time + problem.travel_time(k, last, 0)).max(problem.orders[0].ready_time);
        if time > problem.orders[0].deadline {
            state.violation += problem.orders[0].priority;
        }
        state.time = time;

        debug_assert!(state.dist <= problem.couriers[k].dist_limit);
        debug_assert!(state.time <= problem.couriers[k].finish_time);
    }
}

/// Ascending order on the solution objective.
pub fn compare_objective(a: &Objective, b: &Objective) -> Ordering {
    a.violation.cmp(&b.violation).then_with(|| {
        a.max_norm_duration
            .partial_cmp(&b.max_norm_duration)
            .unwrap_or(Ordering::Equal)
    })
}

/// `true` when `a` is strictly better than `b`.
pub fn objective_better(a: &Objective, b: &Objective) -> bool {
    compare_objective(a, b) == Ordering::Less
}

/// Ordering on the normalized durations of the two routes touched by a
/// cross-route move: the worse one first, then the better one. Distinct
/// from the solution-level objective on purpose.
pub fn compare_duration_pair(a: (f64, f64), b: (f64, f64)) -> Ordering {
    let a = if a.0 >= a.1 { a } else { (a.1, a.0) };
    let b = if b.0 >= b.1 { b } else { (b.1, b.0) };
    a.0.partial_cmp(&b.0)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
}
