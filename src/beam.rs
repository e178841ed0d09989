//! Probabilistic beam search construction guided by pheromone trails.
//!
//! A beam of partial solutions is grown one order per step. Each candidate
//! samples a handful of legal arc extensions, every sampled extension is
//! scored by a greedy lookahead completion, and the best-scoring extended
//! candidates survive to the next step.

use std::time::Instant;

use rand::Rng;

use crate::config::Config;
use crate::evaluation::{append_depot_return, evaluate_solution, objective_better};
use crate::pheromone::PheromoneMatrix;
use crate::problem::Problem;
use crate::solution::{Objective, Solution};

const EPS: f64 = 1e-6;

/// A candidate arc extension: append order `to` after `from` on `courier`.
#[derive(Debug, Clone, Copy)]
pub struct Extension {
    pub from: usize,
    pub to: usize,
    pub courier: usize,
    /// Pheromone times static desirability of the arc.
    pub attractiveness: f64,
}

/// One construction phase over a problem instance.
pub struct BeamSearch<'a> {
    problem: &'a Problem,
    beam_width: usize,
    num_extensions: usize,
    q0: f64,
    deadline: Option<Instant>,
}

impl<'a> BeamSearch<'a> {
    pub fn new(problem: &'a Problem, config: &Config, deadline: Option<Instant>) -> Self {
        BeamSearch {
            problem,
            beam_width: config.beam_width_for(problem.num_orders()),
            num_extensions: config.num_extensions,
            q0: config.q0,
            deadline,
        }
    }

    /// Run one full construction.
    ///
    /// Returns `None` when the beam dies out with no completed rollout to
    /// fall back on, or when the deadline trips mid-construction. Either
    /// way the caller simply skips this iteration.
    pub fn construct<R: Rng>(
        &self,
        pheromone: &PheromoneMatrix,
        rng: &mut R,
    ) -> Option<Solution> {
        let mut beam = vec![Solution::empty(self.problem)];
        let mut best: Option<(Objective, Solution)> = None;

        for _ in 0..self.problem.num_orders() {
            if deadline_passed(self.deadline) {
                return None;
            }
            self.expand(&mut beam, &mut best, pheromone, rng);
            if beam.is_empty() {
                break;
            }
        }

        // Candidates still in the beam are fully assigned; finalize them and
        // keep whichever beats the best rollout observed on the way.
        for mut candidate in beam {
            append_depot_return(&mut candidate, self.problem);
            let objective = evaluate_solution(&candidate, self.problem);
            if best
                .as_ref()
                .map_or(true, |(incumbent, _)| objective_better(&objective, incumbent))
            {
                best = Some((objective, candidate));
            }
        }
        best.map(|(_, solution)| solution)
    }

    /// One construction step: grow every candidate by one order.
    fn expand<R: Rng>(
        &self,
        beam: &mut Vec<Solution>,
        best: &mut Option<(Objective, Solution)>,
        pheromone: &PheromoneMatrix,
        rng: &mut R,
    ) {
        let mut merged: Vec<(Objective, Solution)> = Vec::new();
        for candidate in beam.iter() {
            let (visited, chain_owner) = self.occupancy(&candidate.routes);
            let moves = self.legal_extensions(candidate, &visited, &chain_owner, pheromone);
            if moves.is_empty() {
                continue;
            }

            let mut extended: Vec<(Objective, Solution)> = Vec::new();
            for _ in 0..self.num_extensions {
                let extension = select_roulette(&moves, rng);
                let mut next = candidate.clone();
                apply_extension(&mut next, extension, self.problem);
                let estimate = self.estimate_completion(next.clone(), best, pheromone, rng);
                extended.push((estimate, next));
            }
            rank_candidates(&mut extended, self.num_extensions);
            merged.extend(extended);
        }
        rank_candidates(&mut merged, self.beam_width);
        *beam = merged.into_iter().map(|(_, candidate)| candidate).collect();
    }

    /// Greedily complete a partial candidate with the pseudo-random
    /// proportional rule, one order at a time, and score the result.
    ///
    /// Dead ends score as infeasible. Every completed rollout competes for
    /// the construction-wide best solution, the fallback used when the beam
    /// itself dies.
    fn estimate_completion<R: Rng>(
        &self,
        mut partial: Solution,
        best: &mut Option<(Objective, Solution)>,
        pheromone: &PheromoneMatrix,
        rng: &mut R,
    ) -> Objective {
        let (mut visited, mut chain_owner) = self.occupancy(&partial.routes);
        let mut placed = visited[1..].iter().filter(|&&seen| seen).count();

        while placed < self.problem.num_orders() {
            let moves = self.legal_extensions(&partial, &visited, &chain_owner, pheromone);
            if moves.is_empty() {
                return Objective::infeasible();
            }
            let extension = select_pseudo_random(&moves, self.q0, rng);
            visited[extension.to] = true;
            let chain = self.problem.chain_id[extension.to];
            if chain != 0 {
                chain_owner[chain] = Some(extension.courier);
            }
            apply_extension(&mut partial, extension, self.problem);
            placed += 1;
        }

        append_depot_return(&mut partial, self.problem);
        let objective = evaluate_solution(&partial, self.problem);
        if best
            .as_ref()
            .map_or(true, |(incumbent, _)| objective_better(&objective, incumbent))
        {
            *best = Some((objective, partial));
        }
        objective
    }

    /// Which orders a candidate has placed, and which courier owns each
    /// started chain.
    fn occupancy(&self, routes: &[Vec<usize>]) -> (Vec<bool>, Vec<Option<usize>>) {
        let mut visited = vec![false; self.problem.orders.len()];
        let mut chain_owner = vec![None; self.problem.chain_len.len()];
        for (k, route) in routes.iter().enumerate() {
            for &stop in route {
                visited[stop] = true;
                let chain = self.problem.chain_id[stop];
                if chain != 0 {
                    chain_owner[chain] = Some(k);
                }
            }
        }
        (visited, chain_owner)
    }

    /// Every legal single-order extension of a candidate.
    ///
    /// An order can extend a courier's route when it is unplaced, its chain
    /// predecessor is placed, a started chain stays on its courier, the
    /// courier is eligible, the remaining chain-forward distance to the
    /// depot still fits the distance budget, and the projected arrival back
    /// at the depot (through the rest of the order's chain) meets the
    /// courier's finish time.
    fn legal_extensions(
        &self,
        candidate: &Solution,
        visited: &[bool],
        chain_owner: &[Option<usize>],
        pheromone: &PheromoneMatrix,
    ) -> Vec<Extension> {
        let problem = self.problem;
        let mut moves = Vec::new();
        for to in 1..problem.orders.len() {
            if visited[to] {
                continue;
            }
            if let Some(pred) = problem.orders[to].predecessor {
                if !visited[pred] {
                    continue;
                }
            }
            let chain = problem.chain_id[to];
            for k in 0..problem.num_couriers() {
                if !problem.eligible[k][to] {
                    continue;
                }
                if chain != 0 {
                    if let Some(owner) = chain_owner[chain] {
                        if owner != k {
                            continue;
                        }
                    }
                }
                let route = &candidate.routes[k];
                let from = route[route.len() - 1];
                let courier = &problem.couriers[k];
                let state = &candidate.states[k];
                if state.dist + problem.distance(from, to) + problem.dist_to_depot[to]
                    > courier.dist_limit
                {
                    continue;
                }
                if self.chain_completion_time(k, from, to, state.time) > courier.finish_time {
                    continue;
                }
                moves.push(Extension {
                    from,
                    to,
                    courier: k,
                    attractiveness: pheromone.get(from, to) * problem.desirability[from][to],
                });
            }
        }
        moves
    }

    /// Arrival time at the depot after serving `to` and the rest of its
    /// chain, starting the hop from `from` at `start`.
    fn chain_completion_time(&self, courier: usize, from: usize, to: usize, start: i64) -> i64 {
        let problem = self.problem;
        let mut time = start;
        let mut from = from;
        let mut to = to;
        loop {
            time = (time + problem.travel_time(courier, from, to)).max(problem.orders[to].ready_time);
            if to == 0 {
                return time;
            }
            from = to;
            to = problem.successor[from].unwrap_or(0);
        }
    }
}

/// Apply an extension to a candidate, updating the courier's state.
fn apply_extension(candidate: &mut Solution, extension: Extension, problem: &Problem) {
    let k = extension.courier;
    candidate.routes[k].push(extension.to);
    let state = &mut candidate.states[k];
    let time = (state.time + problem.travel_time(k, extension.from, extension.to))
        .max(problem.orders[extension.to].ready_time);
    if time > problem.orders[extension.to].deadline {
        state.violation += problem.orders[extension.to].priority;
    }
    state.dist += problem.distance(extension.from, extension.to);
    state.time = time;
}

/// Keep the `keep` best candidates by completion estimate; exact duplicates
/// collapse, and ties order by route content so runs are reproducible.
fn rank_candidates(candidates: &mut Vec<(Objective, Solution)>, keep: usize) {
    candidates.sort_by(|a, b| {
        crate::evaluation::compare_objective(&a.0, &b.0)
            .then_with(|| a.1.routes.cmp(&b.1.routes))
    });
    candidates.dedup_by(|a, b| a.0 == b.0 && a.1.routes == b.1.routes);
    candidates.truncate(keep);
}

/// Deterministic arg-max selection; ties resolve by courier, then arc.
pub fn select_greedy(moves: &[Extension]) -> Extension {
    debug_assert!(!moves.is_empty());
    let mut best = moves[0];
    for &candidate in &moves[1..] {
        let stronger = candidate.attractiveness > best.attractiveness
            || (candidate.attractiveness == best.attractiveness
                && (candidate.courier, candidate.from, candidate.to)
                    > (best.courier, best.from, best.to));
        if stronger {
            best = candidate;
        }
    }
    best
}

/// Roulette-wheel selection proportional to attractiveness.
pub fn select_roulette<R: Rng>(moves: &[Extension], rng: &mut R) -> Extension {
    debug_assert!(!moves.is_empty());
    let total: f64 = moves.iter().map(|m| m.attractiveness).sum();
    let target = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    for &candidate in moves {
        cumulative += candidate.attractiveness;
        if cumulative + EPS > target {
            return candidate;
        }
    }
    moves[moves.len() - 1]
}

/// ACS pseudo-random proportional rule: with probability `q0` take the best
/// move outright, otherwise sample by roulette.
pub fn select_pseudo_random<R: Rng>(moves: &[Extension], q0: f64, rng: &mut R) -> Extension {
    if rng.gen::<f64>() <= q0 {
        select_greedy(moves)
    } else {
        select_roulette(moves, rng)
    }
}

fn deadline_passed(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|deadline| Instant::now() >= deadline)
}
