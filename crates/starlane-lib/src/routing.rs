use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::{debug, info};

use crate::cost::{CostConfig, EdgeCostEvaluator, RouteOptions, TravelMethod};
use crate::error::Result;
use crate::graph::{build_graph, Endpoint, Graph, NodeId, Traveler};
use crate::path::{search, SearchTree};
use crate::store::StarmapStore;

/// High-level route planning request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRequest {
    pub start: Endpoint,
    pub goal: Endpoint,
    pub traveler: Traveler,
    pub options: RouteOptions,
}

impl RouteRequest {
    pub fn new(start: Endpoint, goal: Endpoint, traveler: Traveler) -> Self {
        Self {
            start,
            goal,
            traveler,
            options: RouteOptions::default(),
        }
    }

    /// Parse both endpoint literals, reporting the offending field on error.
    pub fn parse(start: &str, goal: &str, traveler: Traveler) -> Result<Self> {
        Ok(Self::new(
            Endpoint::parse_field("start", start)?,
            Endpoint::parse_field("end", goal)?,
            traveler,
        ))
    }

    pub fn with_options(mut self, options: RouteOptions) -> Self {
        self.options = options;
        self
    }
}

/// Node on a planned route, annotated for display.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PathNode {
    pub id: NodeId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub position: Decimal,
}

/// Maximal run of consecutive hops sharing one travel method.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RouteLeg {
    pub from_id: NodeId,
    pub to_id: NodeId,
    pub method: TravelMethod,
}

/// Planned route returned by the library. An unreachable goal yields an
/// empty plan with no distance.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoutePlan {
    pub path: Vec<PathNode>,
    pub legs: Vec<RouteLeg>,
    pub distance: Option<Decimal>,
}

impl RoutePlan {
    pub fn no_route() -> Self {
        Self {
            path: Vec::new(),
            legs: Vec::new(),
            distance: None,
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.distance.is_some()
    }

    /// Number of hops in the route.
    pub fn hop_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Compute the cheapest route for `request` against a fresh snapshot of `store`.
pub fn plan_route(
    store: &dyn StarmapStore,
    request: &RouteRequest,
    config: &CostConfig,
) -> Result<RoutePlan> {
    let graph = build_graph(
        store,
        &request.traveler,
        request.start,
        request.goal,
        config,
    )?;
    let plan = plan_on_graph(&graph, request.options, config);

    info!(
        start = %request.start,
        goal = %request.goal,
        reachable = plan.is_reachable(),
        hops = plan.hop_count(),
        legs = plan.legs.len(),
        "route planned"
    );

    Ok(plan)
}

/// Search and reconstruct on an already built snapshot.
pub fn plan_on_graph(graph: &Graph, options: RouteOptions, config: &CostConfig) -> RoutePlan {
    if graph.system_count() == 0 {
        debug!("no visible systems");
        return RoutePlan::no_route();
    }
    let evaluator = EdgeCostEvaluator::new(graph, options, config);
    let tree = search(&evaluator, graph.start(), graph.goal());
    reconstruct(graph, &tree, graph.goal())
}

/// Walk predecessors from `goal` back to the search source.
pub fn reconstruct(graph: &Graph, tree: &SearchTree, goal: usize) -> RoutePlan {
    let Some(total) = tree.distance(goal) else {
        debug!(goal = %graph.node(goal).id, "goal unreachable");
        return RoutePlan::no_route();
    };

    let source = tree.source();
    let mut hops: Vec<(usize, Option<TravelMethod>)> = Vec::new();
    let mut current = goal;
    loop {
        if hops.len() > graph.len() {
            return RoutePlan::no_route();
        }
        if current == source {
            hops.push((current, None));
            break;
        }
        let Some(pred) = tree.predecessor(current) else {
            return RoutePlan::no_route();
        };
        hops.push((current, Some(pred.method)));
        current = pred.node;
    }
    hops.reverse();

    let path = hops
        .iter()
        .map(|&(idx, _)| {
            let node = graph.node(idx);
            let (x, y) = node.coordinates();
            PathNode {
                id: node.id,
                name: node.name.clone(),
                x,
                y,
                position: node.position,
            }
        })
        .collect();

    // Method of each hop is recorded on the node it arrives at.
    let steps: Vec<(NodeId, TravelMethod)> = hops
        .iter()
        .skip(1)
        .filter_map(|&(idx, method)| method.map(|method| (graph.node(idx).id, method)))
        .collect();

    RoutePlan {
        path,
        legs: segment_legs(graph.node(source).id, &steps),
        distance: Some(round_distance(total)),
    }
}

/// Fold consecutive hops with the same method into legs.
///
/// `steps` lists, in travel order, each node reached and how it was reached.
pub fn segment_legs(origin: NodeId, steps: &[(NodeId, TravelMethod)]) -> Vec<RouteLeg> {
    let mut legs: Vec<RouteLeg> = Vec::new();
    let mut from = origin;

    for &(to, method) in steps {
        match legs.last_mut() {
            Some(leg) if leg.method == method => leg.to_id = to,
            _ => legs.push(RouteLeg {
                from_id: from,
                to_id: to,
                method,
            }),
        }
        from = to;
    }

    legs
}

/// Round to two decimal places, midpoint away from zero, always two digits.
pub fn round_distance(distance: Decimal) -> Decimal {
    let mut rounded = distance.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
