//! Unit tests for the local search operator suite.

use beam_aco_vrp::evaluation::replay_route;
use beam_aco_vrp::local_search::LocalSearch;
use beam_aco_vrp::problem::{Courier, Order, Problem};
use beam_aco_vrp::solution::Solution;
use itertools::Itertools;

fn wide_order() -> Order {
    Order::new(0, 100_000, 5, 0)
}

/// Build a problem over explicit positions on a line, all windows wide open.
fn line_problem(positions: &[i64], couriers: Vec<Courier>) -> Problem {
    line_problem_with_orders(
        positions,
        (0..positions.len()).map(|_| wide_order()).collect(),
        couriers,
    )
}

fn line_problem_with_orders(
    positions: &[i64],
    orders: Vec<Order>,
    couriers: Vec<Courier>,
) -> Problem {
    let distances = positions
        .iter()
        .map(|a| positions.iter().map(|b| (a - b).abs()).collect())
        .collect();
    let eligible = vec![vec![true; positions.len()]; couriers.len()];
    Problem::new(distances, orders, couriers, eligible, true).unwrap()
}

/// Assemble a solution from explicit routes, replaying every state.
fn make_solution(routes: Vec<Vec<usize>>, problem: &Problem) -> Solution {
    let states = routes
        .iter()
        .enumerate()
        .map(|(k, route)| replay_route(route, &problem.couriers[k], k, problem))
        .collect();
    Solution { routes, states }
}

/// Every non-depot stop of `problem` appears exactly once in the solution.
fn assert_coverage(solution: &Solution, problem: &Problem) {
    let mut seen = vec![0usize; problem.orders.len()];
    for route in &solution.routes {
        for &stop in route {
            if stop != 0 {
                seen[stop] += 1;
            }
        }
    }
    for order in 1..problem.orders.len() {
        assert_eq!(seen[order], 1, "order {} covered {} times", order, seen[order]);
    }
}

#[test]
fn test_relocate_balances_couriers() {
    // Orders on opposite sides of the depot, both dumped on one courier.
    let problem = line_problem(
        &[0, 10, -10],
        vec![
            Courier::new(1.0, 100_000, 0, 100_000),
            Courier::new(1.0, 100_000, 0, 100_000),
        ],
    );
    let mut solution = make_solution(vec![vec![0, 1, 2, 0], vec![0, 0]], &problem);

    let improved = LocalSearch::new(50).relocate_pass(&mut solution, &problem);

    assert!(improved);
    assert_coverage(&solution, &problem);
    let worst = solution
        .states
        .iter()
        .zip(&problem.couriers)
        .map(|(state, courier)| state.norm_duration(courier.speed))
        .fold(0.0f64, f64::max);
    assert!(worst < 40.0);
}

#[test]
fn test_relocate_respects_eligibility() {
    let positions = [0i64, 10, -10];
    let distances: Vec<Vec<i64>> = positions
        .iter()
        .map(|a| positions.iter().map(|b| (a - b).abs()).collect())
        .collect();
    let eligible = vec![vec![true; 3], vec![true, false, false]];
    let problem = Problem::new(
        distances,
        vec![wide_order(), wide_order(), wide_order()],
        vec![
            Courier::new(1.0, 100_000, 0, 100_000),
            Courier::new(1.0, 100_000, 0, 100_000),
        ],
        eligible,
        true,
    )
    .unwrap();
    let mut solution = make_solution(vec![vec![0, 1, 2, 0], vec![0, 0]], &problem);

    // Courier 1 may not serve anything, so no relocation can fire.
    assert!(!LocalSearch::new(50).relocate_pass(&mut solution, &problem));
    assert_eq!(solution.routes[0], vec![0, 1, 2, 0]);
}

#[test]
fn test_exchange_swaps_mismatched_assignments() {
    // A slow courier stuck with the far order and a fast one with the near.
    let problem = line_problem(
        &[0, 10, 50],
        vec![
            Courier::new(1.0, 100_000, 0, 100_000),
            Courier::new(5.0, 100_000, 0, 100_000),
        ],
    );
    let mut solution = make_solution(vec![vec![0, 2, 0], vec![0, 1, 0]], &problem);

    let improved = LocalSearch::new(50).exchange_pass(&mut solution, &problem);

    assert!(improved);
    assert_coverage(&solution, &problem);
    assert_eq!(solution.routes[0], vec![0, 1, 0]);
    assert_eq!(solution.routes[1], vec![0, 2, 0]);
}

#[test]
fn test_interchange_moves_whole_short_chain() {
    // Orders 1 -> 2 form a two-member chain on the slow courier.
    let orders = vec![
        wide_order(),
        wide_order(),
        Order::after(0, 100_000, 5, 0, 1),
    ];
    let problem = line_problem_with_orders(
        &[0, 10, 20],
        orders,
        vec![
            Courier::new(1.0, 100_000, 0, 100_000),
            Courier::new(2.0, 100_000, 0, 100_000),
        ],
    );
    let mut solution = make_solution(vec![vec![0, 1, 2, 0], vec![0, 0]], &problem);

    let improved = LocalSearch::new(50).interchange_0_2(&mut solution, &problem);

    assert!(improved);
    assert_coverage(&solution, &problem);
    // The chain moved as a block to the faster courier, order intact.
    assert_eq!(solution.routes[0], vec![0, 0]);
    assert_eq!(solution.routes[1], vec![0, 1, 2, 0]);
}

#[test]
fn test_interchange_refuses_to_split_long_chain() {
    // A three-member chain is never movable as a 2-block.
    let orders = vec![
        wide_order(),
        wide_order(),
        Order::after(0, 100_000, 5, 0, 1),
        Order::after(0, 100_000, 5, 0, 2),
    ];
    let problem = line_problem_with_orders(
        &[0, 10, 20, 30],
        orders,
        vec![
            Courier::new(1.0, 100_000, 0, 100_000),
            Courier::new(10.0, 100_000, 0, 100_000),
        ],
    );
    let mut solution = make_solution(vec![vec![0, 1, 2, 3, 0], vec![0, 0]], &problem);

    assert!(!LocalSearch::new(50).interchange_0_2(&mut solution, &problem));
    assert!(!LocalSearch::new(50).interchange_1_2(&mut solution, &problem));
    assert_eq!(solution.routes[0], vec![0, 1, 2, 3, 0]);
}

#[test]
fn test_segment_swap_exchanges_tails() {
    // Two clusters; each courier serves one near and one far stop.
    let problem = line_problem(
        &[0, 10, 12, 100, 102],
        vec![
            Courier::new(1.0, 100_000, 0, 100_000),
            Courier::new(1.0, 100_000, 0, 100_000),
        ],
    );
    let mut solution = make_solution(vec![vec![0, 1, 4, 0], vec![0, 3, 2, 0]], &problem);
    let before_total = solution.total_distance();

    let improved = LocalSearch::new(50).segment_swap(&mut solution, &problem);

    assert!(improved);
    assert_coverage(&solution, &problem);
    assert!(solution.total_distance() < before_total);
}

#[test]
fn test_segment_swap_never_splits_chains() {
    let orders = vec![
        wide_order(),
        wide_order(),
        Order::after(0, 100_000, 5, 0, 1),
        wide_order(),
        wide_order(),
    ];
    let problem = line_problem_with_orders(
        &[0, 10, 20, 30, 40],
        orders,
        vec![
            Courier::new(1.0, 100_000, 0, 100_000),
            Courier::new(1.0, 100_000, 0, 100_000),
        ],
    );
    let mut solution = make_solution(vec![vec![0, 1, 2, 3, 0], vec![0, 4, 0]], &problem);

    let search = LocalSearch::new(50);
    for _ in 0..50 {
        if !search.segment_swap(&mut solution, &problem) {
            break;
        }
    }

    assert_coverage(&solution, &problem);
    // Wherever the chain ended up, both members sit on one route, in order.
    let route_of = |order: usize| {
        solution
            .routes
            .iter()
            .position(|route| route.contains(&order))
            .unwrap()
    };
    let home = route_of(1);
    assert_eq!(route_of(2), home);
    let route = &solution.routes[home];
    let pos1 = route.iter().position(|&stop| stop == 1).unwrap();
    let pos2 = route.iter().position(|&stop| stop == 2).unwrap();
    assert!(pos1 < pos2);
}

#[test]
fn test_exact_reorder_finds_optimal_route() {
    let problem = line_problem(&[0, 10, 20, 30], vec![Courier::new(1.0, 100_000, 0, 100_000)]);
    let mut solution = make_solution(vec![vec![0, 3, 1, 2, 0]], &problem);
    assert_eq!(solution.states[0].dist, 80);

    LocalSearch::new(50).exact_reorder(&mut solution, &problem, 0);

    // Brute force over all permutations.
    let optimal = (1..4)
        .permutations(3)
        .map(|perm| {
            let mut route = vec![0];
            route.extend(perm);
            route.push(0);
            replay_route(&route, &problem.couriers[0], 0, &problem).dist
        })
        .min()
        .unwrap();

    assert_eq!(solution.states[0].dist, optimal);
    assert_eq!(solution.states[0].dist, 60);
    assert_coverage(&solution, &problem);
}

#[test]
fn test_exact_reorder_respects_chains() {
    // Order 1 must come after order 3 despite the geometry.
    let orders = vec![
        wide_order(),
        Order::after(0, 100_000, 5, 0, 3),
        wide_order(),
        wide_order(),
    ];
    let problem = line_problem_with_orders(
        &[0, 10, 20, 30],
        orders,
        vec![Courier::new(1.0, 100_000, 0, 100_000)],
    );
    let mut solution = make_solution(vec![vec![0, 3, 2, 1, 0]], &problem);

    LocalSearch::new(50).exact_reorder(&mut solution, &problem, 0);

    let route = solution.routes[0].clone();
    let pos3 = route.iter().position(|&stop| stop == 3).unwrap();
    let pos1 = route.iter().position(|&stop| stop == 1).unwrap();
    assert!(pos3 < pos1);
    let replayed = replay_route(&route, &problem.couriers[0], 0, &problem);
    assert!(!replayed.is_infeasible());
    assert_eq!(replayed, solution.states[0]);
}

#[test]
fn test_two_opt_uncrosses_route() {
    let positions: Vec<i64> = (0..11).map(|i| i * 10).collect();
    let problem = line_problem(&positions, vec![Courier::new(1.0, 100_000, 0, 100_000)]);
    // Zig-zag order over ten stops.
    let mut solution = make_solution(vec![vec![0, 2, 1, 4, 3, 6, 5, 8, 7, 10, 9, 0]], &problem);
    let before = solution.states[0].dist;

    LocalSearch::new(50).two_opt(&mut solution, &problem, 0);

    assert!(solution.states[0].dist < before);
    assert_coverage(&solution, &problem);
    let replayed = replay_route(&solution.routes[0], &problem.couriers[0], 0, &problem);
    assert_eq!(replayed, solution.states[0]);
}

#[test]
fn test_one_opt_improves_adjacent_disorder() {
    let positions: Vec<i64> = (0..11).map(|i| i * 10).collect();
    let problem = line_problem(&positions, vec![Courier::new(1.0, 100_000, 0, 100_000)]);
    let mut solution = make_solution(vec![vec![0, 1, 3, 2, 4, 5, 6, 7, 8, 9, 10, 0]], &problem);
    let before = solution.states[0].dist;

    let changed = LocalSearch::new(50).one_opt_pass(&mut solution, &problem, 0);

    assert!(changed);
    assert!(solution.states[0].dist < before);
}

#[test]
fn test_improve_is_idempotent() {
    let problem = line_problem(
        &[0, 10, 20, 30, 40],
        vec![
            Courier::new(1.0, 100_000, 0, 100_000),
            Courier::new(1.0, 100_000, 0, 100_000),
        ],
    );
    let mut solution = make_solution(vec![vec![0, 4, 1, 3, 0], vec![0, 2, 0]], &problem);

    let search = LocalSearch::new(50);
    let mut settled = false;
    for _ in 0..10 {
        let before = solution.clone();
        search.improve(&mut solution, &problem);
        if solution == before {
            settled = true;
            break;
        }
    }
    assert!(settled);

    let fixed = solution.clone();
    search.improve(&mut solution, &problem);
    assert_eq!(solution, fixed);
    assert_coverage(&solution, &problem);
}
