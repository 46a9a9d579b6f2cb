//! Nearest-stop lookup by great-circle distance.
//!
//! A county network has a few dozen stops, so every query computes the
//! haversine distance to every stop and sorts. No spatial index.

use serde::Serialize;

use crate::domain::{Coordinate, StopLocation};

/// Mean Earth radius used for all distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// How many stops a single "auto-fill" lookup wants.
pub const DEFAULT_NEAREST: usize = 1;

/// Errors from proximity queries.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProximityError {
    /// The stations sheet produced no usable stops.
    #[error("no stops available")]
    NoStops,

    /// The query point is not a finite, in-range coordinate.
    #[error("invalid query point ({latitude}, {longitude})")]
    InvalidPoint { latitude: f64, longitude: f64 },
}

/// A stop and its distance from the query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyStop {
    pub stop: StopLocation,
    pub distance_km: f64,
}

/// Great-circle distance in kilometres between two points given in degrees.
///
/// # Examples
///
/// ```
/// use timetable_server::proximity::haversine_km;
///
/// assert_eq!(haversine_km(34.6, 126.7, 34.6, 126.7), 0.0);
///
/// // One degree of latitude is about 111 km.
/// let d = haversine_km(34.0, 126.7, 35.0, 126.7);
/// assert!((d - 111.19).abs() < 0.01);
/// ```
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Stop coordinates, queryable by distance.
#[derive(Debug, Clone, Default)]
pub struct ProximityResolver {
    stops: Vec<StopLocation>,
}

impl ProximityResolver {
    /// Create a resolver over stops in sheet order.
    pub fn new(stops: Vec<StopLocation>) -> Self {
        Self { stops }
    }

    /// The `k` stops closest to `(latitude, longitude)`, nearest first.
    ///
    /// Ties keep sheet order. A stop whose distance comes out non-finite is
    /// skipped rather than failing the whole query.
    pub fn nearest(
        &self,
        latitude: f64,
        longitude: f64,
        k: usize,
    ) -> Result<Vec<NearbyStop>, ProximityError> {
        let point = Coordinate::new(latitude, longitude).map_err(|_| {
            ProximityError::InvalidPoint {
                latitude,
                longitude,
            }
        })?;
        self.nearest_to(point, k)
    }

    /// As [`ProximityResolver::nearest`], for an already validated point.
    pub fn nearest_to(
        &self,
        point: Coordinate,
        k: usize,
    ) -> Result<Vec<NearbyStop>, ProximityError> {
        if self.stops.is_empty() {
            return Err(ProximityError::NoStops);
        }

        let mut nearby: Vec<NearbyStop> = self
            .stops
            .iter()
            .filter_map(|stop| {
                let distance_km = haversine_km(
                    point.latitude(),
                    point.longitude(),
                    stop.position.latitude(),
                    stop.position.longitude(),
                );
                if !distance_km.is_finite() {
                    tracing::debug!(stop = %stop.name, "skipping stop with non-finite distance");
                    return None;
                }
                Some(NearbyStop {
                    stop: stop.clone(),
                    distance_km,
                })
            })
            .collect();

        // Stable sort keeps sheet order between equal distances.
        nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        nearby.truncate(k);

        Ok(nearby)
    }

    /// The single nearest stop.
    pub fn nearest_one(&self, point: Coordinate) -> Result<NearbyStop, ProximityError> {
        self.nearest_to(point, DEFAULT_NEAREST)?
            .into_iter()
            .next()
            .ok_or(ProximityError::NoStops)
    }

    pub fn stops(&self) -> &[StopLocation] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(name: &str, lat: f64, lon: f64) -> StopLocation {
        StopLocation::new(name, Coordinate::new(lat, lon).unwrap())
    }

    fn names(nearby: &[NearbyStop]) -> Vec<&str> {
        nearby.iter().map(|n| n.stop.name.as_str()).collect()
    }

    #[test]
    fn haversine_reflexive() {
        assert_eq!(haversine_km(34.642, 126.767, 34.642, 126.767), 0.0);
        assert_eq!(haversine_km(-90.0, 0.0, -90.0, 0.0), 0.0);
    }

    #[test]
    fn haversine_symmetric() {
        let ab = haversine_km(34.6, 126.7, 35.0, 127.0);
        let ba = haversine_km(35.0, 127.0, 34.6, 126.7);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn haversine_known_distance() {
        // Seoul City Hall to Busan City Hall, roughly 325 km.
        let d = haversine_km(37.5663, 126.9779, 35.1798, 129.0750);
        assert!((d - 325.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn nearest_at_stop_is_zero() {
        let resolver = ProximityResolver::new(vec![stop("A", 34.6, 126.7), stop("B", 34.7, 126.8)]);
        let nearby = resolver.nearest(34.6, 126.7, 1).unwrap();
        assert_eq!(names(&nearby), ["A"]);
        assert_eq!(nearby[0].distance_km, 0.0);
    }

    #[test]
    fn nearest_two_in_order() {
        let resolver = ProximityResolver::new(vec![stop("B", 35.0, 127.0), stop("A", 34.6, 126.7)]);
        let nearby = resolver.nearest(34.61, 126.71, 2).unwrap();
        assert_eq!(names(&nearby), ["A", "B"]);
        assert!(nearby[0].distance_km < nearby[1].distance_km);
    }

    #[test]
    fn ties_keep_sheet_order() {
        let resolver = ProximityResolver::new(vec![
            stop("first", 34.6, 126.7),
            stop("second", 34.6, 126.7),
        ]);
        let nearby = resolver.nearest(34.0, 126.0, 2).unwrap();
        assert_eq!(names(&nearby), ["first", "second"]);
    }

    #[test]
    fn k_larger_than_table() {
        let resolver = ProximityResolver::new(vec![stop("A", 34.6, 126.7)]);
        assert_eq!(resolver.nearest(34.0, 126.0, 3).unwrap().len(), 1);
    }

    #[test]
    fn k_zero_is_empty() {
        let resolver = ProximityResolver::new(vec![stop("A", 34.6, 126.7)]);
        assert!(resolver.nearest(34.0, 126.0, 0).unwrap().is_empty());
    }

    #[test]
    fn empty_table_is_no_stops() {
        let resolver = ProximityResolver::default();
        assert_eq!(resolver.nearest(34.6, 126.7, 1), Err(ProximityError::NoStops));
    }

    #[test]
    fn degenerate_point_is_error_not_panic() {
        let resolver = ProximityResolver::new(vec![stop("A", 34.6, 126.7)]);
        assert!(matches!(
            resolver.nearest(f64::NAN, 126.7, 1),
            Err(ProximityError::InvalidPoint { .. })
        ));
        assert!(matches!(
            resolver.nearest(34.6, 500.0, 1),
            Err(ProximityError::InvalidPoint { .. })
        ));
    }

    #[test]
    fn nearest_one() {
        let resolver = ProximityResolver::new(vec![stop("A", 34.6, 126.7), stop("B", 35.0, 127.0)]);
        let point = Coordinate::new(34.99, 126.99).unwrap();
        assert_eq!(resolver.nearest_one(point).unwrap().stop.name, "B");
    }

    #[test]
    fn error_display() {
        assert_eq!(ProximityError::NoStops.to_string(), "no stops available");
    }
}
