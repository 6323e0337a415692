//! RFC 9457 Problem Details for HTTP APIs.
//!
//! Provides structured error responses following the Problem Details standard.
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use starlane_lib::{Error as LibError, SystemId};

use crate::AppStateError;

/// Problem type URI for systems that do not exist or are not visible.
pub const PROBLEM_UNKNOWN_SYSTEM: &str = "/problems/unknown-system";

/// Problem type URI for invalid request parameters.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// Problem type URI for store failures (missing database, SQLite errors).
pub const PROBLEM_SERVICE_UNAVAILABLE: &str = "/problems/service-unavailable";

/// RFC 9457 Problem Details response structure.
///
/// # Example
///
/// ```
/// use starlane_service_shared::{ProblemDetails, PROBLEM_UNKNOWN_SYSTEM};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(
///     PROBLEM_UNKNOWN_SYSTEM,
///     "Unknown System",
///     StatusCode::NOT_FOUND,
/// )
/// .with_detail("System 42 does not exist or has not been discovered")
/// .with_request_id("req-12345");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Identifier of the specific occurrence (the request ID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Content type for this response (always "application/problem+json").
    pub content_type: String,
}

impl ProblemDetails {
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            content_type: "application/problem+json".to_string(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// 400 Bad Request for invalid input.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 404 Not Found for an endpoint system the traveler cannot see.
    pub fn unknown_system(id: SystemId, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_UNKNOWN_SYSTEM,
            "Unknown System",
            StatusCode::NOT_FOUND,
        )
        .with_detail(format!(
            "System {} does not exist or has not been discovered",
            id
        ))
        .with_request_id(request_id)
    }

    /// 500 Internal Server Error.
    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 503 Service Unavailable for store failures.
    pub fn service_unavailable(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_SERVICE_UNAVAILABLE,
            "Service Unavailable",
            StatusCode::SERVICE_UNAVAILABLE,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.title,
            self.detail.as_deref().unwrap_or("")
        )
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = Json(&self).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );

        *response.status_mut() = status;
        response
    }
}

/// Convert library errors to ProblemDetails.
///
/// Caller mistakes map to 4xx; anything raised by the store maps to 503.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::Validation { .. } => ProblemDetails::bad_request(error.to_string(), request_id),
        LibError::SystemNotFound { id } => ProblemDetails::unknown_system(*id, request_id),
        LibError::DatabaseNotFound { path } => ProblemDetails::service_unavailable(
            format!("Starmap database not available at {}", path.display()),
            request_id,
        ),
        LibError::UnsupportedSchema | LibError::Sqlite(_) | LibError::Io(_) => {
            ProblemDetails::service_unavailable(error.to_string(), request_id)
        }
    }
}

/// Convert state errors (store or worker failures) to ProblemDetails.
pub fn from_state_error(error: &AppStateError, request_id: &str) -> ProblemDetails {
    match error {
        AppStateError::Store(e) => from_lib_error(e, request_id),
        AppStateError::DatabaseNotFound(path) => ProblemDetails::service_unavailable(
            format!("Starmap database not available at {}", path),
            request_id,
        ),
        AppStateError::Worker(e) => ProblemDetails::internal_error(e.clone(), request_id),
    }
}

/// Metric label describing why a request failed.
pub fn failure_reason(error: &AppStateError) -> &'static str {
    match error {
        AppStateError::Store(LibError::Validation { .. }) => "validation_error",
        AppStateError::Store(LibError::SystemNotFound { .. }) => "unknown_system",
        AppStateError::Store(_) | AppStateError::DatabaseNotFound(_) => "store_error",
        AppStateError::Worker(_) => "internal_error",
    }
}
