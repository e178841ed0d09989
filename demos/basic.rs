//! Basic example of using the beam_aco_vrp library.
//!
//! Reads a routing instance from a JSON file, solves it, and prints the
//! resulting routes. Instance format:
//!
//! ```json
//! {
//!   "closed_tour": true,
//!   "distances": [[0, 10], [10, 0]],
//!   "orders": [
//!     { "ready_time": 0, "deadline": 1000, "priority": 0, "service_time": 0, "predecessor": null },
//!     { "ready_time": 0, "deadline": 100, "priority": 5, "service_time": 2, "predecessor": null }
//!   ],
//!   "couriers": [{ "speed": 1.0, "dist_limit": 1000, "start_time": 0, "finish_time": 1000 }],
//!   "eligible": [[true, true]]
//! }
//! ```

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use serde::Deserialize;

use beam_aco_vrp::config::Config;
use beam_aco_vrp::problem::{Courier, Order, Problem};
use beam_aco_vrp::utils::{format_duration, save_solution, SearchStatistics};
use beam_aco_vrp::BeamAco;

/// Solve a delivery routing instance from a JSON file.
#[derive(Parser)]
struct Args {
    /// Path to the instance JSON file
    instance: PathBuf,
    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Wall-clock limit in seconds
    #[arg(long)]
    time_limit: Option<u64>,
    /// Number of independent restarts
    #[arg(long, default_value_t = 1)]
    restarts: usize,
    /// Where to write the solution; stdout summary only when omitted
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Deserialize)]
struct RawInstance {
    closed_tour: bool,
    distances: Vec<Vec<i64>>,
    orders: Vec<Order>,
    couriers: Vec<Courier>,
    eligible: Vec<Vec<bool>>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let raw: RawInstance = serde_json::from_str(&fs::read_to_string(&args.instance)?)?;
    let problem = Problem::new(
        raw.distances,
        raw.orders,
        raw.couriers,
        raw.eligible,
        raw.closed_tour,
    )?;
    println!(
        "Loaded instance: {} orders, {} couriers",
        problem.num_orders(),
        problem.num_couriers()
    );

    let mut config = Config::new().with_seed(args.seed).with_restarts(args.restarts);
    if let Some(seconds) = args.time_limit {
        config = config.with_time_limit(Duration::from_secs(seconds));
    }

    let mut solver = BeamAco::new(problem.clone(), config);
    let start = Instant::now();
    let solution = solver.run()?;
    let runtime = start.elapsed();

    println!("Search completed in {}", format_duration(runtime));
    let stats = SearchStatistics {
        iterations: solver.iterations,
        restarts: solver.config.restarts,
        runtime,
        best_violation: solver.best_objective.violation,
        best_max_norm_duration: solver.best_objective.max_norm_duration,
        total_distance: solution.total_distance(),
    };
    println!("{}", stats.format());

    for (k, route) in solution.routes.iter().enumerate() {
        println!("Courier #{}: {:?}", k, route);
    }

    if let Some(path) = args.output {
        save_solution(&solution, &problem, &path)?;
        println!("Solution written to {}", path.display());
    }

    Ok(())
}
