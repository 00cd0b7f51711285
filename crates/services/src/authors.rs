//! Author profiles and rating recomputation.

use std::sync::Arc;

use domains::{Author, DomainError, Result, UserRepo};
use tracing::{info, instrument};

pub struct AuthorService {
    users: Arc<dyn UserRepo>,
}

impl AuthorService {
    pub fn new(users: Arc<dyn UserRepo>) -> Self {
        Self { users }
    }

    /// Attaches an author profile to an existing user.
    #[instrument(skip(self))]
    pub async fn create_author(&self, user_id: i64) -> Result<Author> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or(DomainError::NotFound("user", user_id))?;
        let author = self.users.create_author(user_id).await?;
        info!(author_id = author.id, "author created");
        Ok(author)
    }

    pub async fn get_author(&self, id: i64) -> Result<Author> {
        self.users
            .get_author(id)
            .await?
            .ok_or(DomainError::NotFound("author", id))
    }

    /// Recomputes the rating from current post and comment ratings and stores it.
    /// The stored value is only as fresh as the last call.
    #[instrument(skip(self))]
    pub async fn update_rating(&self, author_id: i64) -> Result<Author> {
        self.get_author(author_id).await?;
        let totals = self.users.rating_totals(author_id).await?;
        let rating = totals.author_rating();
        let author = self
            .users
            .set_author_rating(author_id, rating)
            .await?
            .ok_or(DomainError::NotFound("author", author_id))?;
        info!(rating, "author rating recomputed");
        Ok(author)
    }
}
