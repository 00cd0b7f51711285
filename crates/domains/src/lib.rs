//! portal/crates/domains/src/lib.rs
//!
//! The central domain model, filter layer and port definitions for the portal.

pub mod errors;
pub mod filters;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use errors::*;
pub use models::*;
pub use ports::*;
