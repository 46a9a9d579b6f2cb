//! Timetable source: the schedule and stations sheets.
//!
//! The spreadsheet's two sheets are read from CSV exports and memoized
//! per file identity, so the tables are parsed once per process unless the
//! files change.

mod cache;
mod error;
mod loader;

pub use cache::{Dataset, SourceCache};
pub use error::SourceError;
pub use loader::{SourceConfig, Timetable, load, read_schedule, read_stations};
