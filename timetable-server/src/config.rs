//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::domain::Coordinate;
use crate::lookup::LookupConfig;
use crate::source::SourceConfig;

/// Directory holding `schedule.csv` and `stations.csv`.
pub const ENV_DATA_DIR: &str = "TIMETABLE_DATA_DIR";
/// Override for the schedule sheet path.
pub const ENV_SCHEDULE_FILE: &str = "TIMETABLE_SCHEDULE_FILE";
/// Override for the stations sheet path.
pub const ENV_STATIONS_FILE: &str = "TIMETABLE_STATIONS_FILE";
/// Listen address, e.g. `0.0.0.0:8080`.
pub const ENV_BIND: &str = "TIMETABLE_BIND";
/// Number of nearby stops to list.
pub const ENV_NEARBY_COUNT: &str = "TIMETABLE_NEARBY_COUNT";
/// Fallback map centre as `lat,lon`.
pub const ENV_DEFAULT_CENTER: &str = "TIMETABLE_DEFAULT_CENTER";

const DEFAULT_BIND: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);

/// A configuration variable held an unusable value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {var}={value:?}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub lookup: LookupConfig,
    pub bind: SocketAddr,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup (the environment in
    /// production, a map in tests). Unset keys fall back to defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut source = match get(ENV_DATA_DIR) {
            Some(dir) => SourceConfig::in_dir(dir),
            None => SourceConfig::default(),
        };
        if let Some(path) = get(ENV_SCHEDULE_FILE) {
            source = source.with_schedule_path(PathBuf::from(path));
        }
        if let Some(path) = get(ENV_STATIONS_FILE) {
            source = source.with_stations_path(PathBuf::from(path));
        }

        let mut lookup = LookupConfig::default();
        if let Some(raw) = get(ENV_NEARBY_COUNT) {
            let n = raw.trim().parse::<usize>().map_err(|e| ConfigError {
                var: ENV_NEARBY_COUNT,
                value: raw.clone(),
                reason: format!("{e}"),
            })?;
            lookup = lookup.with_nearby_count(n);
        }
        if let Some(raw) = get(ENV_DEFAULT_CENTER) {
            lookup = lookup.with_default_center(parse_center(&raw)?);
        }

        let bind = match get(ENV_BIND) {
            Some(raw) => raw.trim().parse::<SocketAddr>().map_err(|e| ConfigError {
                var: ENV_BIND,
                value: raw.clone(),
                reason: format!("{e}"),
            })?,
            None => SocketAddr::from(DEFAULT_BIND),
        };

        Ok(Self {
            source,
            lookup,
            bind,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            lookup: LookupConfig::default(),
            bind: SocketAddr::from(DEFAULT_BIND),
        }
    }
}

fn parse_center(raw: &str) -> Result<Coordinate, ConfigError> {
    let invalid = |reason: String| ConfigError {
        var: ENV_DEFAULT_CENTER,
        value: raw.to_string(),
        reason,
    };

    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| invalid("expected `lat,lon`".to_string()))?;
    Coordinate::parse(lat, lon).map_err(|e| invalid(e.to_string()))
}
