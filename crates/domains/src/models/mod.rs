//! # Domain Models
//!
//! These structs represent the core entities of the portal.
//! Identifiers are store-assigned 64-bit integers.

mod articles;
mod catalog;
mod mail;
mod news;
mod pagination;
mod users;

pub use articles::*;
pub use catalog::*;
pub use mail::*;
pub use news::*;
pub use pagination::*;
pub use users::*;
