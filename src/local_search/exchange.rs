//! Exchange neighborhood: swap two unchained orders between routes.

use crate::problem::Problem;
use crate::solution::Solution;

use super::LocalSearch;

impl LocalSearch {
    /// One exchange sweep; `true` when a move was accepted.
    pub fn exchange_pass(&self, solution: &mut Solution, problem: &Problem) -> bool {
        for k in 0..solution.routes.len() {
            if solution.routes[k].len() < 3 {
                continue;
            }
            for l in k + 1..solution.routes.len() {
                if solution.routes[l].len() < 3 {
                    continue;
                }
                for i in 1..solution.routes[k].len() - 1 {
                    let order_k = solution.routes[k][i];
                    if !problem.eligible[l][order_k] || problem.in_chain(order_k) {
                        continue;
                    }
                    for j in 1..solution.routes[l].len() - 1 {
                        let order_l = solution.routes[l][j];
                        if !problem.eligible[k][order_l] || problem.in_chain(order_l) {
                            continue;
                        }
                        if self.try_exchange(solution, problem, k, i, l, j) {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    /// Swap stop `i` of route `k` with stop `j` of route `l`.
    fn try_exchange(
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

        let mut new_k = Vec::with_capacity(route_k.len());
        for (t, &stop) in route_k.iter().enumerate() {
            new_k.push(if t == i { route_l[j] } else { stop });
        }

        let mut new_l = Vec::with_capacity(route_l.len());
        for (t, &stop) in route_l.iter().enumerate() {
            new_l.push(if t == j { route_k[i] } else { stop });
        }

        self.try_commit_pair(solution, problem, k, l, new_k, new_l)
    }
}
