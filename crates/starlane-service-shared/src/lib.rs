//! Shared infrastructure for Starlane HTTP services.
//!
//! This crate provides common functionality used by the route service:
//!
//! - [`AppState`]: Snapshot source and cost configuration shared across handlers
//! - [`health_live`] / [`health_ready`]: Kubernetes liveness/readiness probes
//! - [`ProblemDetails`]: RFC 9457 Problem Details for consistent error responses
//! - [`ServiceResponse`]: Wrapper for successful responses with content type
//! - [`metrics`]: Prometheus metrics infrastructure
//! - [`logging`]: Structured JSON logging setup
//! - [`middleware`]: Request tracking and metrics middleware
//! - Request types with validation for each endpoint
//!
//! # Architecture
//!
//! Handlers stay thin; all routing semantics live in `starlane-lib`:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  axum Handler                                               │
//! │  - Parse request JSON / query                               │
//! │  - Validate parameters                                      │
//! │  - Open a snapshot reader on a blocking worker              │
//! │  - Call starlane-lib APIs                                   │
//! │  - Format response                                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides an in-memory starmap fixture for handler
//! testing. Enable the `test-utils` feature to access it from dependent crates.

#![deny(warnings)]

mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_route_failed, record_route_hops, record_route_planned,
    record_systems_listed, MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId, REQUEST_ID_HEADER};
pub use problem::{
    failure_reason, from_lib_error, from_state_error, ProblemDetails, PROBLEM_INTERNAL_ERROR,
    PROBLEM_INVALID_REQUEST, PROBLEM_SERVICE_UNAVAILABLE, PROBLEM_UNKNOWN_SYSTEM,
};
pub use request::{RouteRequest, SystemsQuery, Validate};
pub use response::ServiceResponse;
pub use state::{AppState, AppStateError};
