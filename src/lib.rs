//! # Beam-ACO delivery routing
//!
//! A Rust implementation of Beam-ACO (ant-colony-guided probabilistic beam
//! search) for multi-courier delivery routing under hard time windows,
//! per-courier distance budgets, delivery eligibility, and precedence
//! chains between linked stops.
//!
//! Each outer iteration constructs candidate solutions with a pheromone-
//! guided beam search, improves the winner with a suite of cross-route and
//! intra-route local search operators, and feeds the result back into the
//! pheromone matrix. The objective is lexicographic: total deadline
//! violation first, then the worst normalized route duration.

pub mod beam;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod local_search;
pub mod pheromone;
pub mod problem;
pub mod solution;
pub mod utils;

use std::time::{Duration, Instant};

use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::beam::BeamSearch;
use crate::config::Config;
use crate::error::SolveError;
use crate::evaluation::{evaluate_solution, objective_better};
use crate::local_search::LocalSearch;
use crate::pheromone::PheromoneMatrix;
use crate::problem::Problem;
use crate::solution::{Objective, Solution};

/// The main solver structure orchestrating construction, improvement, and
/// pheromone learning across restarts.
pub struct BeamAco {
    pub problem: Problem,
    pub config: Config,
    /// Best solution across all restarts so far.
    pub best_solution: Option<Solution>,
    pub best_objective: Objective,
    pub run_time: Duration,
    /// Outer iterations actually executed.
    pub iterations: u32,
    rng: ChaCha8Rng,
    start_time: Instant,
    deadline: Option<Instant>,
}

impl BeamAco {
    /// Create a solver for the given instance and configuration.
    pub fn new(problem: Problem, config: Config) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        BeamAco {
            problem,
            config,
            best_solution: None,
            best_objective: Objective::infeasible(),
            run_time: Duration::from_secs(0),
            iterations: 0,
            rng,
            start_time: Instant::now(),
            deadline: None,
        }
    }

    /// Run every restart and return the best solution found.
    pub fn run(&mut self) -> Result<Solution, SolveError> {
        self.start_time = Instant::now();
        self.deadline = self.config.time_limit.map(|limit| self.start_time + limit);

        for restart in 0..self.config.restarts {
            debug!("restart {} of {}", restart + 1, self.config.restarts);
            if let Some((solution, objective)) = self.run_restart() {
                if objective_better(&objective, &self.best_objective) {
                    self.best_objective = objective;
                    self.best_solution = Some(solution);
                }
            }
            if self.deadline.is_some_and(|d| Instant::now() >= d) {
                break;
            }
        }

        self.run_time = self.start_time.elapsed();
        self.best_solution
            .clone()
            .ok_or(SolveError::NoFeasibleSolution)
    }

    /// One independent Beam-ACO run with its own pheromone matrix.
    ///
    /// Iterations where construction finds no candidate are skipped, not
    /// failed. Returns the best solution of this restart, if any.
    fn run_restart(&mut self) -> Option<(Solution, Objective)> {
        let problem = &self.problem;
        let config = &self.config;
        let deadline = self.deadline;
        let rng = &mut self.rng;

        let mut pheromone = PheromoneMatrix::new(
            problem.orders.len(),
            config.tau_min,
            config.tau_max,
        );
        let local_search = LocalSearch::new(config.max_sweeps);
        let beam = BeamSearch::new(problem, config, deadline);

        let mut stabilized = false;
        let mut restart_best: Option<(Objective, Solution)> = None;
        let mut best: Option<(Objective, Solution)> = None;
        let mut executed = 0u32;

        for iteration in 0..config.max_iterations {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break;
            }
            executed += 1;

            let Some(mut solution) = beam.construct(&pheromone, rng) else {
                debug!("iteration {}: no candidate constructed", iteration);
                continue;
            };
            local_search.improve(&mut solution, problem);
            let objective = evaluate_solution(&solution, problem);

            if restart_best
                .as_ref()
                .map_or(true, |(incumbent, _)| objective_better(&objective, incumbent))
            {
                restart_best = Some((objective, solution.clone()));
            }
            if best
                .as_ref()
                .map_or(true, |(incumbent, _)| objective_better(&objective, incumbent))
            {
                info!(
                    "iteration {}: new best, violation {} max duration {:.3}",
                    iteration, objective.violation, objective.max_norm_duration
                );
                best = Some((objective, solution.clone()));
            }

            let convergence = pheromone.convergence_factor();
            debug!(
                "iteration {}: objective ({}, {:.3}), convergence {:.4}",
                iteration, objective.violation, objective.max_norm_duration, convergence
            );

            if stabilized && convergence > 0.99 {
                pheromone.reset();
                restart_best = None;
                stabilized = false;
            } else {
                if convergence > 0.99 {
                    stabilized = true;
                }
                let no_routes: &[Vec<usize>] = &[];
                let restart_routes = restart_best
                    .as_ref()
                    .map_or(no_routes, |(_, s)| s.routes.as_slice());
                let best_routes = best.as_ref().map_or(no_routes, |(_, s)| s.routes.as_slice());
                pheromone.update(
                    convergence,
                    stabilized,
                    &solution.routes,
                    restart_routes,
                    best_routes,
                    config.learning_rate,
                );
            }
        }

        self.iterations += executed;
        best.map(|(objective, solution)| (solution, objective))
    }
}

/// Solve an instance in one call with the given configuration.
pub fn solve(problem: Problem, config: Config) -> Result<Solution, SolveError> {
    BeamAco::new(problem, config).run()
}
