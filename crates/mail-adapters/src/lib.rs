//! # mail-adapters
//!
//! Implementations of the `Mailer` port.
//!
//! - [`LogMailer`]: emits each message as a structured log event.
//! - [`MemoryMailer`]: keeps messages in memory; used by tests.
//! - `OutboxMailer` (feature `mail-outbox`): spools each message to a directory
//!   for an external relay to pick up.

mod log;
mod memory;
#[cfg(feature = "mail-outbox")]
mod outbox;

pub use self::log::LogMailer;
pub use memory::MemoryMailer;
#[cfg(feature = "mail-outbox")]
pub use outbox::OutboxMailer;
