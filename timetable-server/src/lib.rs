//! Bus timetable lookup server.
//!
//! Answers "when does the bus leave from this stop?" for a rural route
//! network whose schedule lives in two spreadsheets: one with up and down
//! legs side by side, one with stop coordinates. A rider can type part of
//! a stop name or share their location to search from the nearest stop.

pub mod config;
pub mod domain;
pub mod format;
pub mod lookup;
pub mod proximity;
pub mod source;
pub mod timetable;
pub mod web;
