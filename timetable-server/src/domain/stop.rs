//! Bus stop locations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a coordinate pair is unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate: {reason}")]
pub struct InvalidCoordinate {
    reason: &'static str,
}

/// A WGS84 latitude/longitude pair.
///
/// Both values are finite and within range by construction.
///
/// # Examples
///
/// ```
/// use timetable_server::domain::Coordinate;
///
/// let gangjin = Coordinate::new(34.642, 126.767).unwrap();
/// assert_eq!(gangjin.latitude(), 34.642);
///
/// assert!(Coordinate::new(f64::NAN, 126.767).is_err());
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// assert!(Coordinate::parse("34.6", "동경").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Gangjin County Office, the map centre before a location is known.
    pub const GANGJIN_COUNTY_OFFICE: Coordinate = Coordinate {
        latitude: 34.642,
        longitude: 126.767,
    };

    /// Validate a latitude/longitude pair.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(InvalidCoordinate {
                reason: "must be finite numbers",
            });
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(InvalidCoordinate {
                reason: "latitude must be within [-90, 90]",
            });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidCoordinate {
                reason: "longitude must be within [-180, 180]",
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse from two raw cells, trimming whitespace.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, InvalidCoordinate> {
        let lat = latitude.trim().parse().map_err(|_| InvalidCoordinate {
            reason: "latitude is not a number",
        })?;
        let lon = longitude.trim().parse().map_err(|_| InvalidCoordinate {
            reason: "longitude is not a number",
        })?;
        Self::new(lat, lon)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinate({}, {})", self.latitude, self.longitude)
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            latitude: f64,
            longitude: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Coordinate::new(raw.latitude, raw.longitude).map_err(serde::de::Error::custom)
    }
}

/// A named stop from the stations sheet.
///
/// Names are the join key into the schedule sheet and need not be unique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopLocation {
    pub name: String,
    pub position: Coordinate,
}

impl StopLocation {
    pub fn new(name: impl Into<String>, position: Coordinate) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}
