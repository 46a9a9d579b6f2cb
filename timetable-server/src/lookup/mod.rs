//! One timetable lookup: inputs in, both result tables out.
//!
//! A lookup takes what the rider has given so far (a typed stop name and/or
//! a device location) and returns the up and down tables. If a location is
//! known and nothing was typed, the nearest stop's name is used as the
//! query. Nothing here fails: missing data, a missing location or an empty
//! stations sheet all come back as states in the response.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Coordinate, Direction};
use crate::format::{DisplayRecord, ResultFormatter};
use crate::proximity::{NearbyStop, ProximityError};
use crate::source::Dataset;

/// Default size of the "stops near you" list.
pub const DEFAULT_NEARBY_COUNT: usize = 3;

/// Lookup settings.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// How many nearby stops to list when a location is known.
    pub nearby_count: usize,

    /// Map centre to show while the rider's location is unknown.
    pub default_center: Coordinate,
}

impl LookupConfig {
    /// Set the nearby-stop count (at least one is always resolved).
    pub fn with_nearby_count(mut self, n: usize) -> Self {
        self.nearby_count = n;
        self
    }

    /// Set the fallback map centre.
    pub fn with_default_center(mut self, center: Coordinate) -> Self {
        self.default_center = center;
        self
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            nearby_count: DEFAULT_NEARBY_COUNT,
            default_center: Coordinate::GANGJIN_COUNTY_OFFICE,
        }
    }
}

/// What the device's geolocation provider has reported.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Geolocation {
    /// No location requested.
    #[default]
    NotRequested,
    /// Requested but no fix yet (the provider returned nothing).
    Pending,
    /// The rider refused permission.
    Denied,
    /// A position fix, not yet validated.
    Fix { latitude: f64, longitude: f64 },
}

impl Geolocation {
    /// Map a provider reading: `None` means the fix hasn't arrived.
    pub fn from_reading(reading: Option<(f64, f64)>) -> Self {
        match reading {
            Some((latitude, longitude)) => Geolocation::Fix {
                latitude,
                longitude,
            },
            None => Geolocation::Pending,
        }
    }
}

/// Inputs to one lookup.
#[derive(Debug, Clone, Default)]
pub struct LookupRequest {
    /// The typed stop name fragment, if any.
    pub query: Option<String>,
    pub location: Geolocation,
}

impl LookupRequest {
    /// A plain text search.
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            location: Geolocation::NotRequested,
        }
    }

    /// A location-only search.
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            query: None,
            location: Geolocation::Fix {
                latitude,
                longitude,
            },
        }
    }
}

/// What happened to the location part of a lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LocationStatus {
    NotRequested,
    Pending,
    Denied,
    /// The fix was not a usable coordinate.
    Invalid,
    /// There are no stops to compare against.
    NoStops,
    Resolved { stop_name: String, distance_km: f64 },
}

impl LocationStatus {
    /// A short message for the rider.
    pub fn message(&self) -> Option<String> {
        match self {
            LocationStatus::NotRequested => None,
            LocationStatus::Pending | LocationStatus::Denied => {
                Some("위치 권한을 '허용'으로 바꾼 뒤 잠시 후 다시 눌러주세요.".to_string())
            }
            LocationStatus::Invalid => {
                Some("위치 정보를 읽을 수 없습니다.".to_string())
            }
            LocationStatus::NoStops => Some("정류장 위치 정보가 없습니다.".to_string()),
            LocationStatus::Resolved { stop_name, .. } => {
                Some(format!("내 위치 근처 [{stop_name}] 정류장을 찾았습니다!"))
            }
        }
    }
}

/// Result of one lookup.
#[derive(Debug, Clone, Serialize)]
pub struct LookupResponse {
    /// The query actually searched (typed, or auto-filled from location).
    pub query: String,

    /// False when the timetable source couldn't be loaded.
    pub data_available: bool,

    pub location: LocationStatus,

    /// Where to centre the map: the rider if known, else the default.
    pub map_center: Coordinate,

    /// Closest stops to the rider, nearest first.
    pub nearby: Vec<NearbyStop>,

    pub up: Vec<DisplayRecord>,
    pub down: Vec<DisplayRecord>,
}

/// Run one lookup against the current dataset.
pub fn lookup(
    dataset: &Dataset,
    request: &LookupRequest,
    config: &LookupConfig,
) -> LookupResponse {
    let timetable = dataset.timetable();

    let mut map_center = config.default_center;
    let mut nearby = Vec::new();

    let location = match request.location {
        Geolocation::NotRequested => LocationStatus::NotRequested,
        Geolocation::Pending => LocationStatus::Pending,
        Geolocation::Denied => LocationStatus::Denied,
        Geolocation::Fix {
            latitude,
            longitude,
        } => match Coordinate::new(latitude, longitude) {
            Err(e) => {
                debug!(latitude, longitude, error = %e, "ignoring location fix");
                LocationStatus::Invalid
            }
            Ok(point) => {
                map_center = point;
                match timetable.map(|t| &t.stops) {
                    None => LocationStatus::NoStops,
                    Some(stops) => match stops.nearest_one(point) {
                        Ok(closest) => {
                            nearby = stops
                                .nearest_to(point, config.nearby_count)
                                .unwrap_or_default();
                            LocationStatus::Resolved {
                                stop_name: closest.stop.name,
                                distance_km: closest.distance_km,
                            }
                        }
                        Err(ProximityError::NoStops) => LocationStatus::NoStops,
                        Err(ProximityError::InvalidPoint { .. }) => LocationStatus::Invalid,
                    },
                }
            }
        },
    };

    let typed = request.query.as_deref().unwrap_or("");
    let query = match (&location, typed.is_empty()) {
        (LocationStatus::Resolved { stop_name, .. }, true) => stop_name.clone(),
        _ => typed.to_string(),
    };

    let (up, down) = match timetable {
        Some(t) => (
            ResultFormatter::format(Direction::Up, t.index.search(Direction::Up, &query)),
            ResultFormatter::format(Direction::Down, t.index.search(Direction::Down, &query)),
        ),
        None => (Vec::new(), Vec::new()),
    };

    debug!(
        query = %query,
        up = up.len(),
        down = down.len(),
        ?location,
        "lookup"
    );

    LookupResponse {
        query,
        data_available: timetable.is_some(),
        location,
        map_center,
        nearby,
        up,
        down,
    }
}

/// Raw query-string shape shared by the HTML page and the JSON API.
///
/// Every field is taken as text so that a malformed value never rejects the
/// request; an unreadable coordinate becomes an invalid fix instead.
#[derive(Debug, Default, Deserialize)]
pub struct LookupParams {
    /// Typed stop name fragment.
    pub q: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    /// Set when the provider reported a permission refusal.
    pub denied: Option<String>,
    /// Set when a location was requested but hasn't arrived.
    pub locating: Option<String>,
}

impl LookupParams {
    /// Translate query parameters into a lookup request.
    pub fn into_request(self) -> LookupRequest {
        let location = match (self.lat.as_deref(), self.lon.as_deref()) {
            (Some(lat), Some(lon)) => {
                Geolocation::from_reading(Some((parse_degrees(lat), parse_degrees(lon))))
            }
            _ if flag_set(self.denied.as_deref()) => Geolocation::Denied,
            _ if flag_set(self.locating.as_deref()) => Geolocation::from_reading(None),
            _ => Geolocation::NotRequested,
        };
        LookupRequest {
            query: self.q,
            location,
        }
    }
}

/// Unreadable text maps to NaN, which `lookup` reports as an invalid fix.
fn parse_degrees(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

fn flag_set(raw: Option<&str>) -> bool {
    raw.is_some_and(|v| !matches!(v.trim(), "false" | "0"))
}
