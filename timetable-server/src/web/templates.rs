//! Askama templates for the web frontend.

use askama::Template;

use crate::format::DisplayRecord;
use crate::lookup::{LocationStatus, LookupResponse};

const OSM_EMBED: &str = "https://www.openstreetmap.org/export/embed.html";

/// Half-width of the embedded map, in degrees.
const MAP_SPAN_DEGREES: f64 = 0.01;

/// Search page: form, location status, map point and both result tables.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LookupView,
}

/// Lookup view model for templates.
#[derive(Debug, Clone)]
pub struct LookupView {
    pub query: String,
    pub data_available: bool,
    pub location_message: Option<String>,
    pub location_resolved: bool,
    pub map_lat: f64,
    pub map_lon: f64,
    pub nearby: Vec<NearbyView>,
    pub up: Vec<DisplayRecord>,
    pub down: Vec<DisplayRecord>,
}

/// Nearby stop view model.
#[derive(Debug, Clone)]
pub struct NearbyView {
    pub name: String,
    /// Distance rounded for display, e.g. "0.42 km".
    pub distance: String,
}

impl LookupView {
    /// Whether a search was actually run.
    pub fn has_query(&self) -> bool {
        !self.query.is_empty()
    }

    /// OpenStreetMap embed centred on the map point, with a marker.
    pub fn map_embed_url(&self) -> String {
        let (lat, lon) = (self.map_lat, self.map_lon);
        format!(
            "{OSM_EMBED}?bbox={},{},{},{}&layer=mapnik&marker={lat},{lon}",
            lon - MAP_SPAN_DEGREES,
            lat - MAP_SPAN_DEGREES,
            lon + MAP_SPAN_DEGREES,
            lat + MAP_SPAN_DEGREES,
        )
    }

    /// Create from a lookup response.
    pub fn from_response(response: &LookupResponse) -> Self {
        Self {
            query: response.query.clone(),
            data_available: response.data_available,
            location_message: response.location.message(),
            location_resolved: matches!(response.location, LocationStatus::Resolved { .. }),
            map_lat: response.map_center.latitude(),
            map_lon: response.map_center.longitude(),
            nearby: response
                .nearby
                .iter()
                .map(|n| NearbyView {
                    name: n.stop.name.clone(),
                    distance: format!("{:.2} km", n.distance_km),
                })
                .collect(),
            up: response.up.clone(),
            down: response.down.clone(),
        }
    }
}
