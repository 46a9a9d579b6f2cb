//! Domain types for the bus timetable lookup.
//!
//! This module contains validated timetable data: schedule rows split into
//! named legs, stop locations, and lenient time-of-day values. Types enforce
//! their invariants at construction time, so code that receives them can
//! trust their validity.

mod leg;
mod stop;
mod time;

pub use leg::{Direction, LEG_COLUMNS, Leg, ROW_COLUMNS, ScheduleRow};
pub use stop::{Coordinate, InvalidCoordinate, StopLocation};
pub use time::{TimeError, TimeOfDay, UNPARSEABLE_MINUTES, format_time, parse_day_fraction};
