//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::proximity::NearbyStop;

/// Request for the stops nearest a point.
#[derive(Debug, Deserialize)]
pub struct NearestStopsRequest {
    /// Latitude in degrees
    pub lat: Option<f64>,

    /// Longitude in degrees
    pub lon: Option<f64>,

    /// How many stops to return (defaults to 1)
    pub k: Option<usize>,
}

/// Response for the nearest-stops query.
#[derive(Debug, Serialize)]
pub struct NearestStopsResponse {
    /// Closest stops, nearest first
    pub stops: Vec<NearbyStop>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
