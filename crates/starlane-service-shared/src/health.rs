//! Health check handlers for Kubernetes probes.
//!
//! Provides `/health/live` and `/health/ready` endpoints that return JSON
//! status responses for Kubernetes liveness and readiness probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Status indicator: "ok" or "not_ready: <reason>".
    pub status: String,

    pub service: String,

    pub version: String,

    /// Systems stored in the database (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub systems_stored: Option<usize>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            systems_stored: None,
        }
    }

    pub fn ready(service: &str, version: &str, systems: usize) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            systems_stored: Some(systems),
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            service: service.to_string(),
            version: version.to_string(),
            systems_stored: None,
        }
    }
}

/// Liveness probe handler. Does not touch the database.
///
/// ```text
/// GET /health/live
/// {"status":"ok","service":"starlane-service-shared","version":"0.1.0"}
/// ```
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler.
///
/// Opens a snapshot and counts systems; an unreadable or empty starmap is
/// reported as 503.
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    let counted = state
        .with_reader(|store, _| Ok(store.fetch_visible_systems(None, true)?.len()))
        .await;

    match counted {
        Ok(0) => {
            let status = HealthStatus::not_ready(service, version, "no systems stored");
            (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response()
        }
        Ok(systems) => {
            let status = HealthStatus::ready(service, version, systems);
            (StatusCode::OK, Json(status)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            let status = HealthStatus::not_ready(service, version, "starmap unreadable");
            (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response()
        }
    }
}
