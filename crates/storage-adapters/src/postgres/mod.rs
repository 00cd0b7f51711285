//! # Postgres store
//!
//! Maps the relational schema in `migrations/` onto the domain models.
//! Cascades and unique names are enforced by the schema itself.

mod articles;
mod catalog;
mod news;
mod users;

use domains::{DomainError, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(db_error)?;
        Ok(Self { pool })
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(DomainError::internal)?;
        info!("migrations executed");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Translates driver failures into domain errors; constraint violations become
/// client errors, everything else is internal.
pub(crate) fn db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            let what = match db.constraint() {
                Some("products_name_key") => "a product with this name",
                Some("categories_name_key") => "a category with this name",
                Some("news_name_key") => "news with this name",
                Some("users_username_key") => "a user with this username",
                Some("authors_user_id_key") => "an author profile for this user",
                _ => "this record",
            };
            return DomainError::Conflict(format!("{what} already exists"));
        }
        if db.is_foreign_key_violation() {
            return DomainError::validation(format!(
                "referenced record does not exist ({})",
                db.constraint().unwrap_or("foreign key")
            ));
        }
        if db.is_check_violation() {
            return DomainError::validation(db.message().to_string());
        }
    }
    DomainError::internal(err)
}

/// Escapes `%`, `_` and `\` so user input matches literally inside ILIKE.
pub(crate) fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
