//! Solution representation for the routing solver.

use crate::problem::{Courier, Problem, INF};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mutable simulation state of one courier, attached to a candidate route.
///
/// Always recomputed by replaying the route; never patched independently
/// of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourierState {
    /// Cumulative distance travelled.
    pub dist: i64,
    /// Clock after the last arrival.
    pub time: i64,
    /// Accumulated priority penalty for missed deadlines.
    pub violation: i64,
}

impl CourierState {
    /// State of a courier that has not left the depot.
    pub fn at_start(courier: &Courier) -> Self {
        CourierState {
            dist: 0,
            time: courier.start_time,
            violation: 0,
        }
    }

    /// Sentinel state for a route that breaks a hard constraint.
    pub fn infeasible() -> Self {
        CourierState {
            dist: INF,
            time: INF,
            violation: INF,
        }
    }

    pub fn is_infeasible(&self) -> bool {
        self.violation >= INF
    }

    /// Route distance normalized by the courier speed.
    pub fn norm_duration(&self, speed: f64) -> f64 {
        self.dist as f64 / speed
    }

    /// Route-level ordering used by the intra-route operators: fewer missed
    /// deadlines first, then shorter.
    pub fn better_than(&self, other: &CourierState) -> bool {
        (self.violation, self.dist) < (other.violation, other.dist)
    }
}

/// Lexicographic solution objective: total violation first, then the worst
/// normalized route duration. Compared through
/// [`crate::evaluation::compare_objective`], deliberately not through `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub violation: i64,
    pub max_norm_duration: f64,
}

impl Objective {
    pub fn infeasible() -> Self {
        Objective {
            violation: INF,
            max_norm_duration: f64::INFINITY,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.violation < INF
    }
}

/// A candidate assignment of ordered stops per courier.
///
/// Each route starts at the depot; finalized non-empty routes are also
/// depot-terminated. Invariants: every order appears in exactly one route,
/// exactly once; chain members stay in chain order on a single route;
/// couriers only serve orders they are eligible for.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// One stop sequence per courier.
    pub routes: Vec<Vec<usize>>,
    /// Simulation state per courier, consistent with its route.
    pub states: Vec<CourierState>,
}

impl Solution {
    /// The all-at-depot starting point of a construction.
    pub fn empty(problem: &Problem) -> Self {
        Solution {
            routes: vec![vec![0]; problem.num_couriers()],
            states: problem.couriers.iter().map(CourierState::at_start).collect(),
        }
    }

    /// Total distance over all routes.
    pub fn total_distance(&self) -> i64 {
        self.states.iter().map(|state| state.dist).sum()
    }

    /// Orders served, excluding depot stops.
    pub fn num_served(&self) -> usize {
        self.routes
            .iter()
            .map(|route| route.iter().filter(|&&stop| stop != 0).count())
            .sum()
    }
}

impl fmt::Debug for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solution:")?;
        for (k, route) in self.routes.iter().enumerate() {
            let state = &self.states[k];
            writeln!(
                f,
                "  Courier {}: {:?} (dist: {}, violation: {}, time: {})",
                k, route, state.dist, state.violation, state.time
            )?;
        }
        Ok(())
    }
}
