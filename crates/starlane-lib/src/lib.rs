//! Starlane library entry points.
//!
//! This crate reads a starmap snapshot from a [`StarmapStore`], builds the
//! per-request routing [`Graph`], evaluates multi-modal hop costs and runs the
//! shortest-path search. Higher-level consumers (CLI, HTTP service) should
//! only depend on the functions exported here instead of reimplementing
//! behavior.
//!

#![deny(warnings)]

pub mod cost;
pub mod db;
pub mod error;
pub mod graph;
pub mod output;
pub mod path;
pub mod routing;
pub mod store;

pub use cost::{CostConfig, EdgeCost, EdgeCostEvaluator, RouteOptions, TravelMethod};
pub use db::{
    initialize_schema, spiral_coords, FactionId, FactionRelationship, RelationshipStatus,
    SqliteReader, SqliteStore, SystemId, SystemRecord, WormholePair,
};
pub use error::{Error, Result};
pub use graph::{build_graph, Endpoint, Graph, Node, NodeId, Traveler};
pub use output::{RouteRenderMode, SystemListing, SystemSummary};
pub use path::{search, SearchTree};
pub use routing::{plan_on_graph, plan_route, PathNode, RouteLeg, RoutePlan, RouteRequest};
pub use store::{MemoryStore, SnapshotSource, StarmapStore};
pub use rust_decimal::Decimal;
