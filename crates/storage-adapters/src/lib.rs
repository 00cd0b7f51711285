//! # storage-adapters
//!
//! Implementations of the persistence ports.
//!
//! - [`MemoryStore`]: always compiled; used for development without a database and in tests.
//! - `PgStore` (feature `db-postgres`): PostgreSQL through `sqlx`, with embedded migrations.

pub mod memory;
#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "db-postgres")]
pub use postgres::PgStore;
