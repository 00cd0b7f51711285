//! # api-adapters
//!
//! The HTTP surface of the portal (feature `web-axum`) and the Prometheus
//! registry shared with the background jobs.

pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod routes;
#[cfg(feature = "web-axum")]
pub mod state;

pub use metrics::Metrics;
#[cfg(feature = "web-axum")]
pub use routes::create_router;
#[cfg(feature = "web-axum")]
pub use state::AppState;
