//! HTTP transport for the SNARK submission tracker.
//!
//! Decodes requests into `Command`s, commits them through the `Kernel`, and
//! turns the returned effects into JSON responses and tracing events.

pub mod error;
pub mod rest;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
