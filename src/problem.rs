//! Problem definition and data structures for the delivery routing solver.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};

use crate::error::InstanceError;

/// Sentinel for unbounded or infeasible integer quantities.
///
/// Large enough that no realistic instance reaches it, small enough that
/// sums of a few sentinels never overflow an `i64`.
pub const INF: i64 = 1 << 40;

/// A delivery order. Index 0 is the depot pseudo-order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Earliest service time; arriving earlier means waiting.
    pub ready_time: i64,
    /// Soft deadline; arriving later costs `priority`.
    pub deadline: i64,
    /// Penalty weight charged once when the deadline is missed.
    pub priority: i64,
    /// Handling time spent at this stop before departing.
    pub service_time: i64,
    /// Order that must be delivered before this one, by the same courier.
    pub predecessor: Option<usize>,
}

impl Order {
    /// Create an order without a predecessor.
    pub fn new(ready_time: i64, deadline: i64, priority: i64, service_time: i64) -> Self {
        Order {
            ready_time,
            deadline,
            priority,
            service_time,
            predecessor: None,
        }
    }

    /// Create an order that must follow `predecessor` on the same route.
    pub fn after(
        ready_time: i64,
        deadline: i64,
        priority: i64,
        service_time: i64,
        predecessor: usize,
    ) -> Self {
        Order {
            ready_time,
            deadline,
            priority,
            service_time,
            predecessor: Some(predecessor),
        }
    }
}

/// A courier with its static operating limits. Never mutated by the search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Courier {
    pub speed: f64,
    /// Hard bound on the cumulative route distance.
    pub dist_limit: i64,
    pub start_time: i64,
    /// Hard deadline on the last arrival of the route.
    pub finish_time: i64,
}

impl Courier {
    pub fn new(speed: f64, dist_limit: i64, start_time: i64, finish_time: i64) -> Self {
        Courier {
            speed,
            dist_limit,
            start_time,
            finish_time,
        }
    }
}

/// A validated routing instance with derived lookup tables.
///
/// Construction through [`Problem::new`] checks the instance invariants
/// (consistent dimensions, acyclic precedence paths, depot eligibility,
/// full courier coverage) and precomputes everything the search needs:
/// per-courier travel times, chain membership, remaining chain distance to
/// the depot, and the static arc desirability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    /// Orders, index 0 being the depot.
    pub orders: Vec<Order>,
    pub couriers: Vec<Courier>,
    /// Node-to-node distances; the diagonal is `INF`.
    pub distances: Vec<Vec<i64>>,
    /// `eligible[courier][node]`, closed over chains.
    pub eligible: Vec<Vec<bool>>,
    /// Whether routes must return to the depot for cost accounting.
    pub closed_tour: bool,
    /// `travel_times[courier][i][j]`: travel plus the service time at `i`.
    pub travel_times: Vec<Vec<Vec<i64>>>,
    /// Next order of the chain, if any.
    pub successor: Vec<Option<usize>>,
    /// Chain membership per node; 0 means unchained.
    pub chain_id: Vec<usize>,
    /// Number of members per chain id (entry 0 is unused).
    pub chain_len: Vec<usize>,
    /// Distance still to cover from a node to the depot through the rest of
    /// its chain.
    pub dist_to_depot: Vec<i64>,
    /// Static arc desirability `100 / max(1, dist)`.
    pub desirability: Vec<Vec<f64>>,
}

impl Problem {
    /// Build and validate an instance.
    ///
    /// `distances` must be `(n+1) x (n+1)` for `n+1` orders (depot included),
    /// `eligible` must be `couriers x (n+1)`. For open tours every return
    /// leg to the depot is free and the depot has no deadline.
    pub fn new(
        mut distances: Vec<Vec<i64>>,
        mut orders: Vec<Order>,
        couriers: Vec<Courier>,
        mut eligible: Vec<Vec<bool>>,
        closed_tour: bool,
    ) -> Result<Self, InstanceError> {
        let num_nodes = orders.len();
        if num_nodes == 0 {
            return Err(InstanceError::DimensionMismatch {
                what: "orders",
                expected: 1,
                found: 0,
            });
        }
        check_dims(&distances, &eligible, num_nodes, couriers.len())?;

        for (k, courier) in couriers.iter().enumerate() {
            if courier.speed <= 0.0 {
                return Err(InstanceError::NonPositiveSpeed { courier: k });
            }
        }

        // The depot never has a predecessor.
        orders[0].predecessor = None;

        let successor = link_chains(&orders, num_nodes)?;

        for (i, row) in distances.iter_mut().enumerate() {
            if !closed_tour {
                row[0] = 0;
            }
            row[i] = INF;
        }
        if !closed_tour {
            orders[0].deadline = INF;
            orders[0].priority = 0;
        }

        propagate_ineligibility(&mut eligible, &orders, &successor);
        for (k, row) in eligible.iter().enumerate() {
            if !row[0] {
                return Err(InstanceError::DepotIneligible { courier: k });
            }
        }
        for node in 1..num_nodes {
            if !eligible.iter().any(|row| row[node]) {
                return Err(InstanceError::UnreachableOrder { order: node });
            }
        }

        let (chain_id, chain_len) = number_chains(&orders, &successor);
        let dist_to_depot = chain_distances_to_depot(&distances, &orders, &successor);
        let travel_times = derive_travel_times(&distances, &orders, &couriers);
        let desirability = derive_desirability(&distances);

        Ok(Problem {
            orders,
            couriers,
            distances,
            eligible,
            closed_tour,
            travel_times,
            successor,
            chain_id,
            chain_len,
            dist_to_depot,
            desirability,
        })
    }

    /// Number of orders, excluding the depot.
    pub fn num_orders(&self) -> usize {
        self.orders.len() - 1
    }

    pub fn num_couriers(&self) -> usize {
        self.couriers.len()
    }

    pub fn distance(&self, from: usize, to: usize) -> i64 {
        self.distances[from][to]
    }

    /// Travel time for `courier` on the arc, including the service time at
    /// the origin.
    pub fn travel_time(&self, courier: usize, from: usize, to: usize) -> i64 {
        self.travel_times[courier][from][to]
    }

    /// Whether the node belongs to a precedence chain.
    pub fn in_chain(&self, node: usize) -> bool {
        self.chain_id[node] != 0
    }
}

fn check_dims(
    distances: &[Vec<i64>],
    eligible: &[Vec<bool>],
    num_nodes: usize,
    num_couriers: usize,
) -> Result<(), InstanceError> {
    if distances.len() != num_nodes {
        return Err(InstanceError::DimensionMismatch {
            what: "distance matrix rows",
            expected: num_nodes,
            found: distances.len(),
        });
    }
    for row in distances {
        if row.len() != num_nodes {
            return Err(InstanceError::DimensionMismatch {
                what: "distance matrix columns",
                expected: num_nodes,
                found: row.len(),
            });
        }
    }
    if eligible.len() != num_couriers {
        return Err(InstanceError::DimensionMismatch {
            what: "eligibility matrix rows",
            expected: num_couriers,
            found: eligible.len(),
        });
    }
    for row in eligible {
        if row.len() != num_nodes {
            return Err(InstanceError::DimensionMismatch {
                what: "eligibility matrix columns",
                expected: num_nodes,
                found: row.len(),
            });
        }
    }
    Ok(())
}

/// Validate the predecessor links and derive the successor table.
fn link_chains(orders: &[Order], num_nodes: usize) -> Result<Vec<Option<usize>>, InstanceError> {
    let mut successor = vec![None; num_nodes];
    for (node, order) in orders.iter().enumerate().skip(1) {
        if let Some(pred) = order.predecessor {
            if pred == 0 || pred == node || pred >= num_nodes {
                return Err(InstanceError::InvalidPredecessor {
                    order: node,
                    predecessor: pred,
                });
            }
            if successor[pred].is_some() {
                return Err(InstanceError::SharedPredecessor { predecessor: pred });
            }
            successor[pred] = Some(node);
        }
    }

    let mut graph = DiGraph::<(), ()>::new();
    let indices: Vec<_> = (0..num_nodes).map(|_| graph.add_node(())).collect();
    for (node, order) in orders.iter().enumerate().skip(1) {
        if let Some(pred) = order.predecessor {
            graph.add_edge(indices[pred], indices[node], ());
        }
    }
    if is_cyclic_directed(&graph) {
        return Err(InstanceError::ChainCycle);
    }
    Ok(successor)
}

/// A courier barred from one chain member is barred from the whole chain.
fn propagate_ineligibility(
    eligible: &mut [Vec<bool>],
    orders: &[Order],
    successor: &[Option<usize>],
) {
    for row in eligible.iter_mut() {
        for node in 1..orders.len() {
            if row[node] {
                continue;
            }
            let mut walk = node;
            while let Some(next) = successor[walk] {
                row[next] = false;
                walk = next;
            }
            walk = node;
            while let Some(prev) = orders[walk].predecessor {
                row[prev] = false;
                walk = prev;
            }
        }
    }
}

/// Assign consecutive chain ids by walking each chain from its head.
fn number_chains(orders: &[Order], successor: &[Option<usize>]) -> (Vec<usize>, Vec<usize>) {
    let mut chain_id = vec![0; orders.len()];
    let mut chain_len = vec![0];
    for node in 1..orders.len() {
        if orders[node].predecessor.is_some() || successor[node].is_none() {
            continue;
        }
        chain_len.push(1);
        let id = chain_len.len() - 1;
        chain_id[node] = id;
        let mut walk = node;
        while let Some(next) = successor[walk] {
            chain_id[next] = id;
            chain_len[id] += 1;
            walk = next;
        }
    }
    (chain_id, chain_len)
}

/// Remaining distance to the depot through the rest of a node's chain,
/// accumulated backwards from each chain tail.
fn chain_distances_to_depot(
    distances: &[Vec<i64>],
    orders: &[Order],
    successor: &[Option<usize>],
) -> Vec<i64> {
    let mut dist_to_depot = vec![0; orders.len()];
    for node in 1..orders.len() {
        if successor[node].is_some() {
            continue;
        }
        dist_to_depot[node] = distances[node][0];
        let mut walk = node;
        while let Some(prev) = orders[walk].predecessor {
            dist_to_depot[prev] = dist_to_depot[walk] + distances[prev][walk];
            walk = prev;
        }
    }
    dist_to_depot
}

/// `travel_times[k][i][j] = round(dist[i][j] / speed_k) + service at i`.
fn derive_travel_times(
    distances: &[Vec<i64>],
    orders: &[Order],
    couriers: &[Courier],
) -> Vec<Vec<Vec<i64>>> {
    let num_nodes = orders.len();
    couriers
        .iter()
        .map(|courier| {
            (0..num_nodes)
                .map(|i| {
                    (0..num_nodes)
                        .map(|j| {
                            if i == j {
                                INF
                            } else {
                                (distances[i][j] as f64 / courier.speed
                                    + orders[i].service_time as f64)
                                    .round() as i64
                            }
                        })
                        .collect()
                })
                .collect()
        })
        .collect()
}

fn derive_desirability(distances: &[Vec<i64>]) -> Vec<Vec<f64>> {
    let num_nodes = distances.len();
    (0..num_nodes)
        .map(|i| {
            (0..num_nodes)
                .map(|j| {
                    if i == j {
                        0.0
                    } else {
                        100.0 / distances[i][j].max(1) as f64
                    }
                })
                .collect()
        })
        .collect()
}
