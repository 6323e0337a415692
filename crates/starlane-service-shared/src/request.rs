//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};

use starlane_lib::{
    FactionId, Result as LibResult, RouteOptions, RouteRequest as LibRequest, Traveler,
};

use crate::ProblemDetails;

/// Validation trait for request types.
///
/// Implementations check the shape of the request and return a
/// `ProblemDetails` for invalid input. Endpoint literals are parsed later by
/// the library, which reports its own validation errors.
pub trait Validate {
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Body of `POST /api/v1/route`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Start endpoint: `sys:<id>`, `pos:<decimal>`, or a bare system id.
    pub start: String,

    /// Destination endpoint, same syntax as `start`.
    pub end: String,

    /// Faction whose discoveries limit visibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction_id: Option<FactionId>,

    /// See every system regardless of discovery.
    #[serde(default)]
    pub developer: bool,

    #[serde(default)]
    pub avoid_slow_regions: bool,

    #[serde(default)]
    pub avoid_hostile: bool,
}

impl RouteRequest {
    pub fn traveler(&self) -> Traveler {
        traveler_for(self.faction_id, self.developer)
    }

    pub fn options(&self) -> RouteOptions {
        RouteOptions {
            avoid_slow_regions: self.avoid_slow_regions,
            avoid_hostile: self.avoid_hostile,
        }
    }

    /// Parse the endpoints into a library request.
    pub fn to_lib_request(&self) -> LibResult<LibRequest> {
        Ok(LibRequest::parse(&self.start, &self.end, self.traveler())?.with_options(self.options()))
    }
}

impl Validate for RouteRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.start.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'start' field is required and cannot be empty",
                request_id,
            )));
        }

        if self.end.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'end' field is required and cannot be empty",
                request_id,
            )));
        }

        validate_traveler(self.faction_id, self.developer, request_id)
    }
}

/// Query of `GET /api/v1/systems`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction_id: Option<FactionId>,

    #[serde(default)]
    pub developer: bool,
}

impl SystemsQuery {
    pub fn traveler(&self) -> Traveler {
        traveler_for(self.faction_id, self.developer)
    }
}

impl Validate for SystemsQuery {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        validate_traveler(self.faction_id, self.developer, request_id)
    }
}

fn traveler_for(faction: Option<FactionId>, developer: bool) -> Traveler {
    Traveler {
        faction,
        unrestricted: developer,
    }
}

fn validate_traveler(
    faction: Option<FactionId>,
    developer: bool,
    request_id: &str,
) -> Result<(), Box<ProblemDetails>> {
    match (faction, developer) {
        (Some(_), true) => Err(Box::new(ProblemDetails::bad_request(
            "The 'faction_id' and 'developer' fields are mutually exclusive",
            request_id,
        ))),
        (None, false) => Err(Box::new(ProblemDetails::bad_request(
            "The 'faction_id' field is required unless 'developer' is true",
            request_id,
        ))),
        _ => Ok(()),
    }
}
