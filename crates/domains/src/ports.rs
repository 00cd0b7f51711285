//! # Ports
//!
//! Any adapter must implement these traits to be wired into the binary.
//! Stores are expected to make each method a single atomic operation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::filters::{NewsFilter, ProductFilter};
use crate::models::{
    Author, Category, Comment, NewCategory, NewComment, NewUser, News, NewsInput, OutboundEmail,
    Page, Paginated, Post, PostInput, PostType, Product, ProductInput, RatingTotals, User,
};

/// Persistence contract for categories and products.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CatalogRepo: Send + Sync {
    // Category Operations
    async fn create_category(&self, input: NewCategory) -> Result<Category>;
    async fn get_category(&self, id: i64) -> Result<Option<Category>>;
    async fn list_categories(&self) -> Result<Vec<Category>>;
    /// Removes the category together with its products, article links and subscriptions.
    async fn delete_category(&self, id: i64) -> Result<bool>;

    // Product Operations
    /// Fails with `Conflict` when the name is taken.
    async fn create_product(&self, input: ProductInput) -> Result<Product>;
    async fn get_product(&self, id: i64) -> Result<Option<Product>>;
    async fn update_product(&self, id: i64, input: ProductInput) -> Result<Option<Product>>;
    async fn delete_product(&self, id: i64) -> Result<bool>;
    /// Ordered by name.
    async fn list_products(&self, filter: &ProductFilter, page: Page) -> Result<Paginated<Product>>;
}

/// Category subscription relation.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    /// Flips the membership and returns whether the user is now subscribed.
    async fn toggle_subscription(&self, category_id: i64, user_id: i64) -> Result<bool>;
    async fn category_subscribers(&self, category_id: i64) -> Result<Vec<User>>;
    /// Every user subscribed to at least one category, each listed once.
    async fn all_subscribers(&self) -> Result<Vec<User>>;
}

/// Accounts and their author profiles.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create_user(&self, input: NewUser) -> Result<User>;
    async fn get_user(&self, id: i64) -> Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Fails with `Conflict` when the user already has an author profile.
    async fn create_author(&self, user_id: i64) -> Result<Author>;
    async fn get_author(&self, id: i64) -> Result<Option<Author>>;
    async fn author_username(&self, author_id: i64) -> Result<Option<String>>;
    async fn rating_totals(&self, author_id: i64) -> Result<RatingTotals>;
    async fn set_author_rating(&self, author_id: i64, rating: i32) -> Result<Option<Author>>;
}

/// Persistence contract for news items.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait NewsRepo: Send + Sync {
    /// Fails with `Conflict` when the name is taken.
    async fn create_news(&self, input: NewsInput) -> Result<News>;
    async fn get_news(&self, id: i64) -> Result<Option<News>>;
    async fn update_news(&self, id: i64, input: NewsInput) -> Result<Option<News>>;
    async fn delete_news(&self, id: i64) -> Result<bool>;
    /// Newest first.
    async fn list_news(&self, page: Page) -> Result<Paginated<News>>;
    /// Newest first.
    async fn search_news(&self, filter: &NewsFilter, page: Page) -> Result<Paginated<News>>;
    /// Items with `start <= date_published < end`, oldest first.
    async fn published_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<News>>;
    async fn count_by_author_between(
        &self,
        author_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64>;
}

/// Persistence contract for posts and their comments.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ArticleRepo: Send + Sync {
    async fn create_post(&self, input: PostInput) -> Result<Post>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>>;
    async fn update_post(&self, id: i64, input: PostInput) -> Result<Option<Post>>;
    /// Removes the post together with its comments and category links.
    async fn delete_post(&self, id: i64) -> Result<bool>;
    /// Newest first.
    async fn list_posts(&self, post_type: Option<PostType>, page: Page) -> Result<Paginated<Post>>;
    /// Adds `delta` to the stored rating and returns the new value.
    async fn adjust_post_rating(&self, id: i64, delta: i32) -> Result<Option<i32>>;

    async fn create_comment(&self, input: NewComment) -> Result<Comment>;
    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>>;
    /// Adds `delta` to the stored rating and returns the new value.
    async fn adjust_comment_rating(&self, id: i64, delta: i32) -> Result<Option<i32>>;
}

/// Outbound mail delivery.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<()>;
}

/// Password hashing contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produces a self-describing hash string (e.g. PHC format).
    fn hash(&self, password: &str) -> Result<String>;
    /// Verifies a password against a stored hash; malformed hashes never verify.
    fn verify(&self, password: &str, hash: &str) -> bool;
}
