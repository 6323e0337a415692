use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::cost::{EdgeCostEvaluator, TravelMethod};

/// Predecessor link recorded when a node's distance improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predecessor {
    pub node: usize,
    pub method: TravelMethod,
}

/// Result of a single-source search over a snapshot.
#[derive(Debug, Clone)]
pub struct SearchTree {
    source: usize,
    distances: Vec<Option<Decimal>>,
    predecessors: Vec<Option<Predecessor>>,
    settled: usize,
    evaluations: usize,
}

impl SearchTree {
    pub fn source(&self) -> usize {
        self.source
    }

    /// Best known distance, `None` when unreached.
    pub fn distance(&self, node: usize) -> Option<Decimal> {
        self.distances.get(node).copied().flatten()
    }

    pub fn predecessor(&self, node: usize) -> Option<Predecessor> {
        self.predecessors.get(node).copied().flatten()
    }

    pub fn settled(&self) -> usize {
        self.settled
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }
}

/// Run Dijkstra's algorithm from `source`, stopping once `target` is settled.
///
/// Every node is a candidate neighbour of every other node. Equal tentative
/// distances are popped in ascending order of the node id's string form.
pub fn search(evaluator: &EdgeCostEvaluator<'_>, source: usize, target: usize) -> SearchTree {
    let graph = evaluator.graph();
    let count = graph.len();
    let ranks = tie_break_ranks(graph.nodes().iter().map(|node| node.id.to_string()));

    let mut distances: Vec<Option<Decimal>> = vec![None; count];
    let mut predecessors: Vec<Option<Predecessor>> = vec![None; count];
    let mut settled_flags = vec![false; count];
    let mut queue = BinaryHeap::new();
    let mut settled = 0usize;
    let mut evaluations = 0usize;

    distances[source] = Some(Decimal::ZERO);
    queue.push(QueueEntry {
        cost: Decimal::ZERO,
        rank: ranks[source],
        node: source,
    });

    while let Some(entry) = queue.pop() {
        match distances[entry.node] {
            Some(best) if entry.cost > best => continue,
            None => continue,
            Some(_) => {}
        }
        if settled_flags[entry.node] {
            continue;
        }
        settled_flags[entry.node] = true;
        settled += 1;

        if entry.node == target {
            break;
        }

        for next in 0..count {
            if next == entry.node || settled_flags[next] {
                continue;
            }

            let edge = evaluator.evaluate(entry.node, next);
            evaluations += 1;

            let next_cost = entry.cost.saturating_add(edge.cost);
            let improved = distances[next].map_or(true, |current| next_cost < current);
            if improved {
                distances[next] = Some(next_cost);
                predecessors[next] = Some(Predecessor {
                    node: entry.node,
                    method: edge.method,
                });
                queue.push(QueueEntry {
                    cost: next_cost,
                    rank: ranks[next],
                    node: next,
                });
            }
        }
    }

    debug!(settled, evaluations, nodes = count, "route search finished");

    SearchTree {
        source,
        distances,
        predecessors,
        settled,
        evaluations,
    }
}

/// Position of each key in ascending lexicographic order.
fn tie_break_ranks(keys: impl Iterator<Item = String>) -> Vec<usize> {
    let keys: Vec<String> = keys.collect();
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));

    let mut ranks = vec![0; keys.len()];
    for (rank, idx) in order.into_iter().enumerate() {
        ranks[idx] = rank;
    }
    ranks
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    cost: Decimal,
    rank: usize,
    node: usize,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost, then rank.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.rank.cmp(&self.rank))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
