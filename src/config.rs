//! Configuration parameters for the Beam-ACO solver.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration settings for the Beam-ACO solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Beam width; `None` derives it from the instance size.
    pub beam_width: Option<usize>,
    /// Extensions sampled per beam candidate at each construction step
    pub num_extensions: usize,
    /// Probability of taking the best move deterministically (ACS rule)
    pub q0: f64,
    /// Pheromone learning rate applied at each update
    pub learning_rate: f64,
    /// Lower pheromone bound
    pub tau_min: f64,
    /// Upper pheromone bound
    pub tau_max: f64,
    /// Outer iterations per restart
    pub max_iterations: usize,
    /// Number of independent restarts
    pub restarts: usize,
    /// Sweep cap for each local search operator family
    pub max_sweeps: usize,
    /// Seed for the random source; fixed seed means reproducible runs
    pub seed: u64,
    /// Optional wall-clock bound for the whole solve
    pub time_limit: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            beam_width: None,
            num_extensions: 2,
            q0: 0.9,
            learning_rate: 0.45,
            tau_min: 0.001,
            tau_max: 0.999,
            max_iterations: 100,
            restarts: 1,
            max_sweeps: 50,
            seed: 42,
            time_limit: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Beam width to use for an instance with `n` orders.
    pub fn beam_width_for(&self, n: usize) -> usize {
        self.beam_width.unwrap_or(3 + usize::from(n > 50))
    }

    /// Set a fixed beam width.
    pub fn with_beam_width(mut self, width: usize) -> Self {
        self.beam_width = Some(width);
        self
    }

    /// Set the number of extensions sampled per candidate.
    pub fn with_num_extensions(mut self, extensions: usize) -> Self {
        self.num_extensions = extensions;
        self
    }

    /// Set the deterministic-selection probability.
    pub fn with_q0(mut self, q0: f64) -> Self {
        self.q0 = q0;
        self
    }

    /// Set the pheromone learning rate.
    pub fn with_learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = rate;
        self
    }

    /// Set the pheromone bounds.
    pub fn with_tau_bounds(mut self, tau_min: f64, tau_max: f64) -> Self {
        self.tau_min = tau_min;
        self.tau_max = tau_max;
        self
    }

    /// Set the number of outer iterations per restart.
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Set the number of independent restarts.
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Set the local search sweep cap.
    pub fn with_max_sweeps(mut self, sweeps: usize) -> Self {
        self.max_sweeps = sweeps;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the time limit.
    pub fn with_time_limit(mut self, duration: Duration) -> Self {
        self.time_limit = Some(duration);
        self
    }
}
