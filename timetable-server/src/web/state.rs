//! Application state for the web layer.

use std::sync::Arc;

use crate::lookup::LookupConfig;
use crate::source::SourceCache;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Memoized timetable source
    pub source: SourceCache,

    /// Lookup settings
    pub lookup: Arc<LookupConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(source: SourceCache, lookup: LookupConfig) -> Self {
        Self {
            source,
            lookup: Arc::new(lookup),
        }
    }
}
