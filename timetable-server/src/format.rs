//! Display records for search results.

use serde::Serialize;

use crate::domain::{Direction, Leg, ScheduleRow, format_time};

/// One line of a result table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRecord {
    pub stop_name: String,
    /// Departure as `HH:MM` (or the first five characters of free text).
    pub departure: String,
    pub arrival: String,
    pub route_id: String,
    pub course_id: String,
}

impl DisplayRecord {
    /// Render a single leg.
    pub fn from_leg(leg: &Leg) -> Self {
        Self {
            stop_name: leg.stop_name.clone(),
            departure: format_time(&leg.departure),
            arrival: format_time(&leg.arrival),
            route_id: leg.route_id.clone(),
            course_id: leg.course_id.clone(),
        }
    }
}

/// Turns search matches into display records.
///
/// Order is preserved: the index already sorted by departure.
pub struct ResultFormatter;

impl ResultFormatter {
    /// Format the `direction` leg of each row.
    ///
    /// Rows without that leg are skipped; [`crate::timetable::TimetableIndex::search`]
    /// never returns such rows.
    pub fn format<'a>(
        direction: Direction,
        rows: impl IntoIterator<Item = &'a ScheduleRow>,
    ) -> Vec<DisplayRecord> {
        rows.into_iter()
            .filter_map(|row| row.leg(direction))
            .map(DisplayRecord::from_leg)
            .collect()
    }
}
