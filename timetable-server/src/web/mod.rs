//! Web layer for the bus timetable lookup.
//!
//! Serves the search page plus JSON endpoints for lookups and nearest stops.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
