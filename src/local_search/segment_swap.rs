//! Tail exchange between two routes at chain-safe cut positions.

use crate::problem::Problem;
use crate::solution::Solution;

use super::LocalSearch;

/// Positions of `route` after which a cut leaves no chain open.
///
/// Position 0 (right after the leading depot) always qualifies; interior
/// positions qualify whenever every chain seen so far is fully contained in
/// the prefix.
fn cut_positions(problem: &Problem, route: &[usize]) -> Vec<usize> {
    let mut positions = vec![0];
    let mut seen = vec![0usize; problem.chain_len.len()];
    let mut open_chains = 0usize;
    for i in 1..route.len() - 1 {
        let chain = problem.chain_id[route[i]];
        if chain == 0 {
            if open_chains == 0 {
                positions.push(i);
            }
            continue;
        }
        seen[chain] += 1;
        if seen[chain] == 1 {
            open_chains += 1;
        } else if seen[chain] == problem.chain_len[chain] {
            open_chains -= 1;
        }
        if open_chains == 0 {
            positions.push(i);
        }
    }
    positions
}

impl LocalSearch {
    /// One tail-exchange sweep; `true` when a move was accepted.
    ///
    /// Cuts both routes at chain-safe positions and swaps the tails.
    pub fn segment_swap(&self, solution: &mut Solution, problem: &Problem) -> bool {
        let cuts: Vec<Vec<usize>> = solution
            .routes
            .iter()
            .map(|route| {
                if route.len() < 3 {
                    Vec::new()
                } else {
                    cut_positions(problem, route)
                }
            })
            .collect();

        for k in 0..solution.routes.len() {
            if solution.routes[k].len() < 3 {
                continue;
            }
            for l in k + 1..solution.routes.len() {
                if solution.routes[l].len() < 3 {
                    continue;
                }
                for &i in &cuts[k] {
                    for &j in &cuts[l] {
                        if self.try_tail_swap(solution, problem, k, i, l, j) {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    /// Swap the tail after position `i` of route `k` with the tail after
    /// position `j` of route `l`.
    fn try_tail_swap(
        &self,
        solution: &mut Solution,
        problem: &Problem,
        k: usize,
        i: usize,
        l: usize,
        j: usize,
    ) -> bool {
        let route_k = &solution.routes[k];
        let route_l = &solution.routes[l];

        let mut new_k = Vec::with_capacity(i + 1 + route_l.len().saturating_sub(j + 1));
        new_k.extend_from_slice(&route_k[..=i]);
        new_k.extend_from_slice(&route_l[j + 1..]);

        let mut new_l = Vec::with_capacity(j + 1 + route_k.len().saturating_sub(i + 1));
        new_l.extend_from_slice(&route_l[..=j]);
        new_l.extend_from_slice(&route_k[i + 1..]);

        self.try_commit_pair(solution, problem, k, l, new_k, new_l)
    }
}
