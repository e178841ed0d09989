//! Error types reported by the solver.

use std::error::Error;
use std::fmt;

/// Errors found while validating a problem instance, before any search runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceError {
    /// A matrix dimension disagrees with the declared order or courier count.
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// The precedence links do not form directed paths.
    ChainCycle,
    /// Two orders name the same predecessor.
    SharedPredecessor { predecessor: usize },
    /// A predecessor index is out of range, the depot, or the order itself.
    InvalidPredecessor { order: usize, predecessor: usize },
    /// No courier is eligible to deliver this order.
    UnreachableOrder { order: usize },
    /// Every courier must be able to serve the depot.
    DepotIneligible { courier: usize },
    /// Courier speeds must be strictly positive.
    NonPositiveSpeed { courier: usize },
}

impl fmt::Display for InstanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceError::DimensionMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "dimension mismatch in {}: expected {}, found {}",
                what, expected, found
            ),
            InstanceError::ChainCycle => write!(f, "precedence links form a cycle"),
            InstanceError::SharedPredecessor { predecessor } => {
                write!(f, "order {} is the predecessor of two orders", predecessor)
            }
            InstanceError::InvalidPredecessor { order, predecessor } => {
                write!(f, "order {} has invalid predecessor {}", order, predecessor)
            }
            InstanceError::UnreachableOrder { order } => {
                write!(f, "no courier is eligible for order {}", order)
            }
            InstanceError::DepotIneligible { courier } => {
                write!(f, "courier {} is not eligible for the depot", courier)
            }
            InstanceError::NonPositiveSpeed { courier } => {
                write!(f, "courier {} has a non-positive speed", courier)
            }
        }
    }
}

impl Error for InstanceError {}

/// Errors reported by a finished solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// Every restart ended without a single feasible solution.
    NoFeasibleSolution,
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::NoFeasibleSolution => write!(f, "no feasible solution found"),
        }
    }
}

impl Error for SolveError {}
