//! Unit tests for the probabilistic beam search construction.

use beam_aco_vrp::beam::BeamSearch;
use beam_aco_vrp::config::Config;
use beam_aco_vrp::pheromone::PheromoneMatrix;
use beam_aco_vrp::problem::{Courier, Order, Problem};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn wide_order() -> Order {
    Order::new(0, 100_000, 5, 0)
}

fn line_problem(positions: &[i64], couriers: Vec<Courier>) -> Problem {
    let distances = positions
        .iter()
        .map(|a| positions.iter().map(|b| (a - b).abs()).collect())
        .collect();
    let orders = (0..positions.len()).map(|_| wide_order()).collect();
    let eligible = vec![vec![true; positions.len()]; couriers.len()];
    Problem::new(distances, orders, couriers, eligible, true).unwrap()
}

fn fresh_pheromone(problem: &Problem, config: &Config) -> PheromoneMatrix {
    PheromoneMatrix::new(problem.orders.len(), config.tau_min, config.tau_max)
}

#[test]
fn test_construct_covers_every_order() {
    let problem = line_problem(
        &[0, 10, 20, 30, 40, 50],
        vec![
            Courier::new(1.0, 100_000, 0, 100_000),
            Courier::new(1.0, 100_000, 0, 100_000),
        ],
    );
    let config = Config::new();
    let beam = BeamSearch::new(&problem, &config, None);
    let pheromone = fresh_pheromone(&problem, &config);
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let solution = beam.construct(&pheromone, &mut rng).unwrap();

    let mut seen = vec![0usize; problem.orders.len()];
    for route in &solution.routes {
        assert_eq!(route[0], 0);
        if route.len() > 1 {
            assert_eq!(*route.last().unwrap(), 0);
        }
        for &stop in route {
            if stop != 0 {
                seen[stop] += 1;
            }
        }
    }
    for order in 1..problem.orders.len() {
        assert_eq!(seen[order], 1);
    }
}

#[test]
fn test_construct_respects_hard_limits() {
    // Tight distance budgets force the orders across both couriers.
    let problem = line_problem(
        &[0, 10, -10],
        vec![
            Courier::new(1.0, 25, 0, 100_000),
            Courier::new(1.0, 25, 0, 100_000),
        ],
    );
    let config = Config::new();
    let beam = BeamSearch::new(&problem, &config, None);
    let pheromone = fresh_pheromone(&problem, &config);
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let solution = beam.construct(&pheromone, &mut rng).unwrap();

    for (k, state) in solution.states.iter().enumerate() {
        assert!(state.dist <= problem.couriers[k].dist_limit);
        assert!(state.time <= problem.couriers[k].finish_time);
    }
    // Neither courier can hold both orders within 25 distance units.
    assert!(solution.routes.iter().all(|route| route.len() <= 3));
}

#[test]
fn test_construct_keeps_chain_on_one_courier() {
    let positions = [0i64, 10, 20, -10];
    let distances: Vec<Vec<i64>> = positions
        .iter()
        .map(|a| positions.iter().map(|b| (a - b).abs()).collect())
        .collect();
    let orders = vec![
        wide_order(),
        wide_order(),
        Order::after(0, 100_000, 5, 0, 1),
        wide_order(),
    ];
    let couriers = vec![
        Courier::new(1.0, 100_000, 0, 100_000),
        Courier::new(1.0, 100_000, 0, 100_000),
    ];
    let eligible = vec![vec![true; 4]; 2];
    let problem = Problem::new(distances, orders, couriers, eligible, true).unwrap();

    let config = Config::new();
    let beam = BeamSearch::new(&problem, &config, None);
    let pheromone = fresh_pheromone(&problem, &config);

    for seed in 0..20 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let solution = beam.construct(&pheromone, &mut rng).unwrap();
        let home = solution
            .routes
            .iter()
            .position(|route| route.contains(&1))
            .unwrap();
        let route = &solution.routes[home];
        let pos1 = route.iter().position(|&stop| stop == 1).unwrap();
        let pos2 = route.iter().position(|&stop| stop == 2);
        assert_eq!(pos2.map(|p| p > pos1), Some(true));
    }
}

#[test]
fn test_construct_returns_none_when_nothing_is_reachable() {
    // No courier can reach any order before its finish time.
    let problem = line_problem(
        &[0, 100, 200],
        vec![Courier::new(1.0, 100_000, 0, 50)],
    );
    let config = Config::new();
    let beam = BeamSearch::new(&problem, &config, None);
    let pheromone = fresh_pheromone(&problem, &config);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    assert!(beam.construct(&pheromone, &mut rng).is_none());
}

#[test]
fn test_construct_is_deterministic_under_fixed_seed() {
    let problem = line_problem(
        &[0, 10, 25, 40, -15, -30],
        vec![
            Courier::new(1.0, 100_000, 0, 100_000),
            Courier::new(2.0, 100_000, 0, 100_000),
        ],
    );
    let config = Config::new();
    let beam = BeamSearch::new(&problem, &config, None);
    let pheromone = fresh_pheromone(&problem, &config);

    let mut rng_a = ChaCha8Rng::seed_from_u64(99);
    let mut rng_b = ChaCha8Rng::seed_from_u64(99);
    let a = beam.construct(&pheromone, &mut rng_a).unwrap();
    let b = beam.construct(&pheromone, &mut rng_b).unwrap();

    assert_eq!(a.routes, b.routes);
    assert_eq!(a.states, b.states);
}
