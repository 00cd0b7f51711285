//! # DomainError
//!
//! Centralized error handling for the portal.
//! Every port and service returns this type; adapters map their own failures into it.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Resource not found (e.g., Product, News, Post)
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, i64),

    /// Validation failure (e.g., name equals description, negative price)
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing or invalid credentials
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but lacking the permission for this action
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource already exists (e.g., duplicate product name)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Publication quota exhausted
    #[error("too many requests: {0}")]
    RateLimited(String),

    /// Infrastructure failure (e.g., DB down, mail relay unreachable)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A specialized Result type for portal logic.
pub type Result<T> = std::result::Result<T, DomainError>;
