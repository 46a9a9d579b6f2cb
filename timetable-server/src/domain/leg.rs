//! Schedule rows and their up/down legs.
//!
//! The schedule sheet stores both directions of a route side by side: the
//! first five columns are the up leg, the next five the down leg. Each half
//! is parsed into a named [`Leg`] so nothing downstream indexes columns.

use std::fmt;

use super::time::TimeOfDay;

/// Number of columns that make up one leg.
pub const LEG_COLUMNS: usize = 5;

/// Number of columns in a full schedule row.
pub const ROW_COLUMNS: usize = LEG_COLUMNS * 2;

/// Which half of a schedule row to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Both directions, up first.
    pub const ALL: [Direction; 2] = [Direction::Up, Direction::Down];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// One direction's worth of a schedule row.
///
/// A leg only exists if all five cells were filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leg {
    pub stop_name: String,
    pub departure: TimeOfDay,
    pub arrival: TimeOfDay,
    pub route_id: String,
    pub course_id: String,
}

impl Leg {
    /// Build a leg from its five raw cells.
    ///
    /// Returns `None` if any cell is blank. Partially filled halves are
    /// normal in a hand-maintained sheet and are simply not searchable.
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_server::domain::Leg;
    ///
    /// let leg = Leg::from_cells(["강진터미널", "09:00", "09:10", "101", "A"]).unwrap();
    /// assert_eq!(leg.stop_name, "강진터미널");
    ///
    /// assert!(Leg::from_cells(["강진터미널", "09:00", " ", "101", "A"]).is_none());
    /// ```
    pub fn from_cells(cells: [&str; LEG_COLUMNS]) -> Option<Self> {
        if cells.iter().any(|c| c.trim().is_empty()) {
            return None;
        }
        let [stop_name, departure, arrival, route_id, course_id] = cells;

        Some(Self {
            stop_name: stop_name.trim().to_string(),
            departure: TimeOfDay::from_cell(departure),
            arrival: TimeOfDay::from_cell(arrival),
            route_id: route_id.trim().to_string(),
            course_id: course_id.trim().to_string(),
        })
    }

    /// Sort key: departure minutes since midnight.
    pub fn departure_minutes(&self) -> u32 {
        self.departure.minutes_since_midnight()
    }
}

/// A full schedule row: up to two legs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleRow {
    pub up: Option<Leg>,
    pub down: Option<Leg>,
}

impl ScheduleRow {
    /// Build a row from raw cells.
    ///
    /// Short rows are padded with blanks; extra trailing cells are ignored.
    pub fn from_cells<'a>(cells: impl IntoIterator<Item = &'a str>) -> Self {
        let mut padded = [""; ROW_COLUMNS];
        for (slot, cell) in padded.iter_mut().zip(cells) {
            *slot = cell;
        }

        let [a, b, c, d, e, f, g, h, i, j] = padded;
        Self {
            up: Leg::from_cells([a, b, c, d, e]),
            down: Leg::from_cells([f, g, h, i, j]),
        }
    }

    /// The leg for `direction`, if complete.
    pub fn leg(&self, direction: Direction) -> Option<&Leg> {
        match direction {
            Direction::Up => self.up.as_ref(),
            Direction::Down => self.down.as_ref(),
        }
    }

    /// Whether neither half is usable.
    pub fn is_empty(&self) -> bool {
        self.up.is_none() && self.down.is_none()
    }
}
