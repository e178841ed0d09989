//! Pheromone matrix and the learning loop around it.

use itertools::Itertools;

/// Symmetric pheromone trail matrix with `[tau_min, tau_max]` clamping.
///
/// One instance per restart; it is the only learning signal carried across
/// outer iterations.
#[derive(Debug, Clone)]
pub struct PheromoneMatrix {
    tau: Vec<Vec<f64>>,
    tau_min: f64,
    tau_max: f64,
}

impl PheromoneMatrix {
    /// A fresh matrix over `num_nodes` nodes, saturated at `tau_max`.
    pub fn new(num_nodes: usize, tau_min: f64, tau_max: f64) -> Self {
        PheromoneMatrix {
            tau: vec![vec![tau_max; num_nodes]; num_nodes],
            tau_min,
            tau_max,
        }
    }

    /// Reset every trail to `tau_max`, as after a convergence restart.
    pub fn reset(&mut self) {
        for row in &mut self.tau {
            row.fill(self.tau_max);
        }
    }

    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.tau[from][to]
    }

    /// How collapsed the matrix is toward its bounds.
    ///
    /// 0 means maximal distance from both bounds everywhere; values near 1
    /// mean nearly every trail sits on a bound.
    pub fn convergence_factor(&self) -> f64 {
        let num_nodes = self.tau.len();
        let mut sum = 0.0;
        for (i, row) in self.tau.iter().enumerate() {
            for (j, &tau) in row.iter().enumerate() {
                if i != j {
                    sum += (self.tau_max - tau).max(tau - self.tau_min);
                }
            }
        }
        let total = (num_nodes * num_nodes) as f64;
        2.0 * sum / (total * (self.tau_max - self.tau_min)) - 1.0
    }

    /// Deposit weights for (iteration-best, restart-best, best-so-far) by
    /// convergence phase. Once the post-restart stabilization flag is set,
    /// only the best-so-far solution deposits.
    pub fn deposit_weights(convergence: f64, stabilized: bool) -> (f64, f64, f64) {
        if stabilized {
            return (0.0, 0.0, 1.0);
        }
        if convergence < 0.4 {
            (1.0, 0.0, 0.0)
        } else if convergence < 0.6 {
            (2.0 / 3.0, 1.0 / 3.0, 0.0)
        } else if convergence < 0.8 {
            (1.0 / 3.0, 2.0 / 3.0, 0.0)
        } else {
            (0.0, 0.0, 1.0)
        }
    }

    /// One learning step: accumulate weighted deposits on the arcs the
    /// contributing solutions actually traverse, then move every trail
    /// toward its deposit by `learning_rate` and clamp.
    pub fn update(
        &mut self,
        convergence: f64,
        stabilized: bool,
        iteration_best: &[Vec<usize>],
        restart_best: &[Vec<usize>],
        best_so_far: &[Vec<usize>],
        learning_rate: f64,
    ) {
        let (w_ib, w_rb, w_bf) = Self::deposit_weights(convergence, stabilized);
        let num_nodes = self.tau.len();
        let mut delta = vec![vec![0.0; num_nodes]; num_nodes];
        deposit(&mut delta, iteration_best, w_ib);
        deposit(&mut delta, restart_best, w_rb);
        deposit(&mut delta, best_so_far, w_bf);

        for i in 0..num_nodes {
            for j in 0..num_nodes {
                if i == j {
                    continue;
                }
                let tau = self.tau[i][j] + learning_rate * (delta[i][j] - self.tau[i][j]);
                self.tau[i][j] = tau.clamp(self.tau_min, self.tau_max);
            }
        }
    }
}

/// Add `weight` on every arc of every route, in both directions.
fn deposit(delta: &mut [Vec<f64>], routes: &[Vec<usize>], weight: f64) {
    if weight == 0.0 {
        return;
    }
    for route in routes {
        for (&from, &to) in route.iter().tuple_windows() {
            delta[from][to] += weight;
            delta[to][from] += weight;
        }
    }
}
