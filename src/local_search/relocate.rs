//! Relocate neighborhood: move one unchained order to another route.

use crate::problem::Problem;
use crate::solution::Solution;

use super::LocalSearch;

impl LocalSearch {
    /// One relocate sweep; `true` when a move was accepted.
    ///
    /// Moves a single unchained order from route `k` to any position of
    /// route `l` (including an idle route), first improvement.
    pub fn relocate_pass(&self, solution: &mut Solution, problem: &Problem) -> bool {
        for k in 0..solution.routes.len() {
            if solution.routes[k].len() < 3 {
                continue;
            }
            for l in 0..solution.routes.len() {
                if l == k {
                    continue;
                }
                for i in 1..solution.routes[k].len() - 1 {
                    let order = solution.routes[k][i];
                    if !problem.eligible[l][order] || problem.in_chain(order) {
                        continue;
                    }
                    for j in 0..solution.routes[l].len() - 1 {
                        if self.try_relocate(solution, problem, k, i, l, j) {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    /// Move stop `i` of route `k` to just after position `j` of route `l`.
    fn try_relocate(
        &self,
        solution: &mut Solution,
        problem: &Problem,
        k: usize,
        i: usize,
        l: usize,
        j: usize,
    ) -> bool {
        let from_route = &solution.routes[k];
        let to_route = &solution.routes[l];

        let mut new_k = Vec::with_capacity(from_route.len() - 1);
        for (t, &stop) in from_route.iter().enumerate() {
            if t != i {
                new_k.push(stop);
            }
        }

        let mut new_l = Vec::with_capacity(to_route.len() + 1);
        for (t, &stop) in to_route.iter().enumerate() {
            new_l.push(stop);
            if t == j {
                new_l.push(from_route[i]);
            }
        }

        self.try_commit_pair(solution, problem, k, l, new_k, new_l)
    }
}
