//! Web layer for the departure display.
//!
//! Exposes the latest batch event over HTTP for the display front-end.

mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
