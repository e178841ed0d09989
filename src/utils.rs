//! Utility functions and structures for the routing solver.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::evaluation::evaluate_solution;
use crate::problem::Problem;
use crate::solution::Solution;

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Save a solution to a file.
///
/// Writes each courier's stop sequence and final `(dist, violation, time)`
/// state, then the objective and the total distance. For open tours the
/// trailing depot stop is dropped from the printed sequence.
pub fn save_solution<P: AsRef<Path>>(
    solution: &Solution,
    problem: &Problem,
    path: P,
) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    let objective = evaluate_solution(solution, problem);

    for (k, route) in solution.routes.iter().enumerate() {
        let mut stops = route.clone();
        if !problem.closed_tour && stops.len() > 1 {
            stops.pop();
        }

        write!(file, "Courier #{}: ", k)?;
        let mut first = true;
        for stop in stops {
            if first {
                write!(file, "{}", stop)?;
                first = false;
            } else {
                write!(file, " -> {}", stop)?;
            }
        }
        writeln!(file)?;

        let state = &solution.states[k];
        writeln!(
            file,
            "  dist: {}  violation: {}  time: {}",
            state.dist, state.violation, state.time
        )?;
    }

    writeln!(file)?;
    writeln!(
        file,
        "Objective: violation {} / worst normalized duration {:.6}",
        objective.violation, objective.max_norm_duration
    )?;
    writeln!(file, "Total distance: {}", solution.total_distance())?;

    Ok(())
}

/// Statistics about a finished solve.
pub struct SearchStatistics {
    pub iterations: u32,
    pub restarts: usize,
    pub runtime: Duration,
    pub best_violation: i64,
    pub best_max_norm_duration: f64,
    pub total_distance: i64,
}

impl SearchStatistics {
    /// Format the statistics as a string.
    pub fn format(&self) -> String {
        format!(
            "Search Statistics:
- Iterations: {}
- Restarts: {}
- Runtime: {}
- Best Violation: {}
- Best Max Normalized Duration: {:.3}
- Total Distance: {}",
            self.iterations,
            self.restarts,
            format_duration(self.runtime),
            self.best_violation,
            self.best_max_norm_duration,
            self.total_distance
        )
    }
}
