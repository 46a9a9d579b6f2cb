//! Timetable source error types.

use std::path::PathBuf;

/// Errors that make the timetable data unavailable.
///
/// Individual bad rows are not errors; they are skipped during loading.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The sheet file doesn't exist
    #[error("file not found: {}", path.display())]
    Missing { path: PathBuf },

    /// The sheet file exists but couldn't be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sheet isn't valid CSV (e.g. unreadable header row)
    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required column header is absent
    #[error("{} has no `{column}` column", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
}
