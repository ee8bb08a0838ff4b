//! Web layer for the travel planner.
//!
//! JSON endpoints proxying flight and hotel search, estimating trip
//! expenses, and re-timing itineraries.

mod dto;
mod routes;
mod state;
mod validate;

#[cfg(test)]
mod routes_tests;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use validate::{FieldError, ValidationErrors, Validator};
