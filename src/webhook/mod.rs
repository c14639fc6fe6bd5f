//! HTTP surface: provider webhook, health check and CSV export.

pub mod routes;
pub mod twiml;

pub use routes::{AppState, app_routes};
