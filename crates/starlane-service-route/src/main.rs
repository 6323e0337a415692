//! Starlane route planning HTTP service.
//!
//! # Endpoints
//!
//! - `POST /api/v1/route` - Cheapest route between two endpoints
//! - `GET /api/v1/systems` - Systems and wormholes visible to a traveler
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live` - Kubernetes liveness probe
//! - `GET /health/ready` - Kubernetes readiness probe
//!
//! # Configuration
//!
//! - `STARLANE_DB` - Path to the starmap SQLite database (default: starlane.db)
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `METRICS_ENABLED` - Install the Prometheus recorder (default: true)
//! - `STARLANE_PENALTY_FACTOR`, `STARLANE_SLOW_EFFECT` - Edge cost tuning
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text

use std::env;
use std::net::SocketAddr;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use starlane_lib::{plan_route, CostConfig, RoutePlan, RouteRenderMode, SystemListing};
use starlane_service_shared::{
    extract_or_generate_request_id, failure_reason, from_lib_error, from_state_error,
    health_live, health_ready, init_logging, init_metrics, metrics_handler, record_route_failed,
    record_route_hops, record_route_planned, record_systems_listed, AppState, LoggingConfig,
    MetricsConfig, MetricsLayer, ProblemDetails, RouteRequest, ServiceResponse, SystemsQuery,
    Validate,
};

const SERVICE: &str = "route";

/// Route response returned to the caller.
#[derive(Debug, Serialize)]
struct RouteResponse {
    /// Number of hops; 0 when unreachable.
    hops: usize,
    #[serde(flatten)]
    plan: RoutePlan,
    /// In-game note rendering, present for reachable routes.
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

impl From<RoutePlan> for RouteResponse {
    fn from(plan: RoutePlan) -> Self {
        let note = plan
            .is_reachable()
            .then(|| plan.render(RouteRenderMode::InGameNote));
        Self {
            hops: plan.hop_count(),
            plan,
            note,
        }
    }
}

/// HTTP response - either success or RFC 9457 error.
#[derive(Debug)]
enum Response<T> {
    Success(ServiceResponse<T>),
    Error(ProblemDetails),
}

impl<T: Serialize> IntoResponse for Response<T> {
    fn into_response(self) -> axum::response::Response {
        match self {
            Response::Success(data) => (StatusCode::OK, Json(data)).into_response(),
            Response::Error(problem) => problem.into_response(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service(SERVICE);
    init_logging(&logging_config);

    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        warn!(error = %e, "metrics recorder not installed, continuing without metrics");
    }

    let db_path = env::var("STARLANE_DB").unwrap_or_else(|_| "starlane.db".to_string());
    let port: u16 = env::var("SERVICE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    info!(db_path = %db_path, port, "starting route service");

    let config = CostConfig::from_env().map_err(|e| {
        error!(error = %e, "invalid routing configuration");
        e
    })?;

    let state = AppState::load(&db_path, config).map_err(|e| {
        error!(error = %e, path = %db_path, "failed to load application state");
        e
    })?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/route", post(route_handler))
        .route("/api/v1/systems", get(systems_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(TraceLayer::new_for_http())
        .layer(MetricsLayer)
        .with_state(state)
}

/// Handle POST /api/v1/route requests.
async fn route_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RouteRequest>,
) -> Response<RouteResponse> {
    let request_id = extract_or_generate_request_id(&headers);

    info!(
        request_id = %request_id,
        start = %request.start,
        end = %request.end,
        faction_id = ?request.faction_id,
        developer = request.developer,
        "handling route request"
    );

    if let Err(problem) = request.validate(request_id.as_str()) {
        record_route_failed("validation_error", SERVICE);
        return Response::Error(*problem);
    }

    let lib_request = match request.to_lib_request() {
        Ok(lib_request) => lib_request,
        Err(e) => {
            record_route_failed("validation_error", SERVICE);
            return Response::Error(from_lib_error(&e, request_id.as_str()));
        }
    };

    let planned = state
        .with_reader(move |store, config| plan_route(store, &lib_request, config))
        .await;

    let plan = match planned {
        Ok(plan) => plan,
        Err(e) => {
            let reason = failure_reason(&e);
            if reason == "store_error" || reason == "internal_error" {
                error!(request_id = %request_id, error = %e, "route planning failed");
            } else {
                warn!(request_id = %request_id, error = %e, "route request rejected");
            }
            record_route_failed(reason, SERVICE);
            return Response::Error(from_state_error(&e, request_id.as_str()));
        }
    };

    if plan.is_reachable() {
        record_route_planned("reachable", SERVICE);
        record_route_hops(plan.hop_count(), plan.legs.len());
    } else {
        record_route_planned("unreachable", SERVICE);
    }

    info!(
        request_id = %request_id,
        hops = plan.hop_count(),
        legs = plan.legs.len(),
        distance = ?plan.distance,
        "route computed"
    );

    Response::Success(ServiceResponse::new(RouteResponse::from(plan)))
}

/// Handle GET /api/v1/systems requests.
async fn systems_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SystemsQuery>,
) -> Response<SystemListing> {
    let request_id = extract_or_generate_request_id(&headers);

    if let Err(problem) = query.validate(request_id.as_str()) {
        return Response::Error(*problem);
    }

    let traveler = query.traveler();
    let listed = state
        .with_reader(move |store, _| SystemListing::load(store, &traveler))
        .await;

    match listed {
        Ok(listing) => {
            record_systems_listed(listing.systems.len(), SERVICE);
            Response::Success(ServiceResponse::new(listing))
        }
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "systems listing failed");
            Response::Error(from_state_error(&e, request_id.as_str()))
        }
    }
}
