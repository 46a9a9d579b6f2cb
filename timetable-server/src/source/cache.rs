//! Load-once memoization of the timetable sheets.
//!
//! The tables are keyed by the identity of both files (path, modification
//! time and size). As long as neither file changes, every caller gets the
//! same `Arc<Timetable>` without touching the disk again. A failed load is
//! memoized too, so a broken source degrades to "no data" instead of being
//! re-read on every request.
//!
//! Only the current identity is worth keeping. When either file changes,
//! older entries are evicted before the new load is inserted, so the fresh
//! tables are never refused admission by stale ones.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use moka::sync::Cache as MokaCache;
use tracing::{debug, info, warn};

use super::error::SourceError;
use super::loader::{SourceConfig, Timetable, load};

/// Identities kept at once. Stale identities are evicted on change.
const MAX_IDENTITIES: u64 = 4;

/// Identity of one sheet file at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FileStamp {
    path: PathBuf,
    modified: Option<SystemTime>,
    len: Option<u64>,
}

impl FileStamp {
    fn of(path: &Path) -> Self {
        let meta = std::fs::metadata(path).ok();
        Self {
            path: path.to_path_buf(),
            modified: meta.as_ref().and_then(|m| m.modified().ok()),
            len: meta.as_ref().map(|m| m.len()),
        }
    }
}

/// Cache key: both files' identities.
type SourceKey = (FileStamp, FileStamp);

/// Result of loading the source, shared between callers.
#[derive(Debug, Clone)]
pub enum Dataset {
    /// Both sheets loaded.
    Ready(Arc<Timetable>),
    /// The source is missing or malformed; queries return nothing.
    Unavailable(Arc<SourceError>),
}

impl Dataset {
    /// The loaded tables, if any.
    pub fn timetable(&self) -> Option<&Arc<Timetable>> {
        match self {
            Dataset::Ready(t) => Some(t),
            Dataset::Unavailable(_) => None,
        }
    }

    /// The load failure, if any.
    pub fn error(&self) -> Option<&SourceError> {
        match self {
            Dataset::Ready(_) => None,
            Dataset::Unavailable(e) => Some(e.as_ref()),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Dataset::Ready(_))
    }
}

/// Memoized access to the timetable source.
#[derive(Clone)]
pub struct SourceCache {
    config: SourceConfig,
    tables: MokaCache<SourceKey, Dataset>,
    current: Arc<Mutex<Option<SourceKey>>>,
}

impl SourceCache {
    /// Create a cache for the sheets described by `config`.
    ///
    /// Nothing is read until the first call to [`SourceCache::dataset`].
    pub fn new(config: SourceConfig) -> Self {
        let tables = MokaCache::builder().max_capacity(MAX_IDENTITIES).build();
        Self {
            config,
            tables,
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// The current tables, loading them if the files changed (or on first
    /// use).
    ///
    /// Concurrent first calls for the same identity share one load.
    pub fn dataset(&self) -> Dataset {
        let key = (
            FileStamp::of(&self.config.schedule_path),
            FileStamp::of(&self.config.stations_path),
        );
        self.evict_if_changed(&key);

        self.tables.get_with(key, || match load(&self.config) {
            Ok(timetable) => {
                info!(
                    schedule = %self.config.schedule_path.display(),
                    stations = %self.config.stations_path.display(),
                    "timetable source loaded"
                );
                Dataset::Ready(Arc::new(timetable))
            }
            Err(e) => {
                warn!(error = %e, "timetable source unavailable");
                Dataset::Unavailable(Arc::new(e))
            }
        })
    }

    /// The source configuration.
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Forget every memoized load.
    pub fn invalidate(&self) {
        let keys: Vec<Arc<SourceKey>> = self.tables.iter().map(|(key, _)| key).collect();
        for key in keys {
            self.tables.invalidate(key.as_ref());
        }
        self.tables.run_pending_tasks();
    }

    fn evict_if_changed(&self, key: &SourceKey) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if current.as_ref() == Some(key) {
            return;
        }
        if current.is_some() {
            debug!(
                schedule = %self.config.schedule_path.display(),
                "timetable source changed, evicting old tables"
            );
            self.invalidate();
        }
        *current = Some(key.clone());
    }
}
