//! # In-memory store
//!
//! Implements every persistence port over plain ordered maps behind one
//! `RwLock`, so each method is atomic with respect to the others. Foreign keys
//! and unique names are checked the way the Postgres schema enforces them.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::filters::{NewsFilter, ProductFilter};
use domains::{
    ArticleRepo, Author, CatalogRepo, Category, Comment, DomainError, NewCategory, NewComment,
    NewUser, News, NewsInput, NewsRepo, Page, Paginated, Post, PostInput, PostType, Product,
    ProductInput, RatingTotals, Result, SubscriptionRepo, User, UserRepo,
};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct Tables {
    sequences: HashMap<&'static str, i64>,
    categories: BTreeMap<i64, Category>,
    products: BTreeMap<i64, Product>,
    users: BTreeMap<i64, User>,
    authors: BTreeMap<i64, Author>,
    /// (category_id, user_id)
    subscriptions: BTreeSet<(i64, i64)>,
    news: BTreeMap<i64, News>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
}

impl Tables {
    fn next_id(&mut self, table: &'static str) -> i64 {
        let seq = self.sequences.entry(table).or_insert(0);
        *seq += 1;
        *seq
    }

    fn product_name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.products
            .values()
            .any(|p| p.name == name && Some(p.id) != except)
    }

    fn news_name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.news
            .values()
            .any(|n| n.name == name && Some(n.id) != except)
    }

    fn require_category(&self, id: i64) -> Result<()> {
        if self.categories.contains_key(&id) {
            Ok(())
        } else {
            Err(missing_reference("category", id))
        }
    }

    fn require_author(&self, id: i64) -> Result<()> {
        if self.authors.contains_key(&id) {
            Ok(())
        } else {
            Err(missing_reference("author", id))
        }
    }

    fn author_username(&self, author_id: i64) -> Option<&str> {
        let author = self.authors.get(&author_id)?;
        self.users.get(&author.user_id).map(|u| u.username.as_str())
    }

    fn users_by_ids(&self, ids: impl IntoIterator<Item = i64>) -> Vec<User> {
        ids.into_iter()
            .filter_map(|id| self.users.get(&id).cloned())
            .collect()
    }
}

fn missing_reference(table: &str, id: i64) -> DomainError {
    DomainError::validation(format!("referenced {table} {id} does not exist"))
}

fn newest_news_first(a: &News, b: &News) -> std::cmp::Ordering {
    b.date_published
        .cmp(&a.date_published)
        .then_with(|| b.id.cmp(&a.id))
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepo for MemoryStore {
    async fn create_category(&self, input: NewCategory) -> Result<Category> {
        let mut t = self.tables.write().await;
        if t.categories.values().any(|c| c.name == input.name) {
            return Err(DomainError::Conflict(format!(
                "category `{}` already exists",
                input.name
            )));
        }
        let category = Category {
            id: t.next_id("categories"),
            name: input.name,
        };
        t.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let t = self.tables.read().await;
        let mut all: Vec<Category> = t.categories.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn delete_category(&self, id: i64) -> Result<bool> {
        let mut t = self.tables.write().await;
        if t.categories.remove(&id).is_none() {
            return Ok(false);
        }
        let before = t.products.len();
        t.products.retain(|_, p| p.category_id != id);
        let removed_products = before - t.products.len();
        for post in t.posts.values_mut() {
            post.category_ids.retain(|c| *c != id);
        }
        t.subscriptions.retain(|(category_id, _)| *category_id != id);
        debug!(category_id = id, removed_products, "category cascade applied");
        Ok(true)
    }

    async fn create_product(&self, input: ProductInput) -> Result<Product> {
        let mut t = self.tables.write().await;
        t.require_category(input.category_id)?;
        if t.product_name_taken(&input.name, None) {
            return Err(DomainError::Conflict(format!(
                "product `{}` already exists",
                input.name
            )));
        }
        let id = t.next_id("products");
        let product = input.into_product(id);
        t.products.insert(id, product.clone());
        Ok(product)
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn update_product(&self, id: i64, input: ProductInput) -> Result<Option<Product>> {
        let mut t = self.tables.write().await;
        if !t.products.contains_key(&id) {
            return Ok(None);
        }
        t.require_category(input.category_id)?;
        if t.product_name_taken(&input.name, Some(id)) {
            return Err(DomainError::Conflict(format!(
                "product `{}` already exists",
                input.name
            )));
        }
        let product = input.into_product(id);
        t.products.insert(id, product.clone());
        Ok(Some(product))
    }

    async fn delete_product(&self, id: i64) -> Result<bool> {
        Ok(self.tables.write().await.products.remove(&id).is_some())
    }

    async fn list_products(&self, filter: &ProductFilter, page: Page) -> Result<Paginated<Product>> {
        let t = self.tables.read().await;
        let mut matching: Vec<Product> = t
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(Paginated::from_ordered(matching, page))
    }
}

#[async_trait]
impl SubscriptionRepo for MemoryStore {
    async fn toggle_subscription(&self, category_id: i64, user_id: i64) -> Result<bool> {
        let mut t = self.tables.write().await;
        t.require_category(category_id)?;
        if !t.users.contains_key(&user_id) {
            return Err(missing_reference("user", user_id));
        }
        let key = (category_id, user_id);
        if t.subscriptions.remove(&key) {
            Ok(false)
        } else {
            t.subscriptions.insert(key);
            Ok(true)
        }
    }

    async fn category_subscribers(&self, category_id: i64) -> Result<Vec<User>> {
        let t = self.tables.read().await;
        let ids = t
            .subscriptions
            .iter()
            .filter(|(c, _)| *c == category_id)
            .map(|(_, u)| *u);
        Ok(t.users_by_ids(ids))
    }

    async fn all_subscribers(&self) -> Result<Vec<User>> {
        let t = self.tables.read().await;
        let ids: BTreeSet<i64> = t.subscriptions.iter().map(|(_, u)| *u).collect();
        Ok(t.users_by_ids(ids))
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.username == input.username) {
            return Err(DomainError::Conflict(format!(
                "user `{}` already exists",
                input.username
            )));
        }
        let user = User {
            id: t.next_id("users"),
            username: input.username,
            email: input.email,
            password_hash: input.password_hash,
            permissions: input.permissions,
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.username == username).cloned())
    }

    async fn create_author(&self, user_id: i64) -> Result<Author> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&user_id) {
            return Err(missing_reference("user", user_id));
        }
        if t.authors.values().any(|a| a.user_id == user_id) {
            return Err(DomainError::Conflict(format!(
                "user {user_id} already has an author profile"
            )));
        }
        let author = Author {
            id: t.next_id("authors"),
            user_id,
            rating: 0,
        };
        t.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn get_author(&self, id: i64) -> Result<Option<Author>> {
        Ok(self.tables.read().await.authors.get(&id).cloned())
    }

    async fn author_username(&self, author_id: i64) -> Result<Option<String>> {
        let t = self.tables.read().await;
        Ok(t.author_username(author_id).map(str::to_string))
    }

    async fn rating_totals(&self, author_id: i64) -> Result<RatingTotals> {
        let t = self.tables.read().await;
        let Some(author) = t.authors.get(&author_id) else {
            return Ok(RatingTotals::default());
        };
        let own_posts: BTreeSet<i64> = t
            .posts
            .values()
            .filter(|p| p.author_id == author_id)
            .map(|p| p.id)
            .collect();
        Ok(RatingTotals {
            posts: t
                .posts
                .values()
                .filter(|p| p.author_id == author_id)
                .map(|p| i64::from(p.rating))
                .sum(),
            own_comments: t
                .comments
                .values()
                .filter(|c| c.user_id == author.user_id)
                .map(|c| i64::from(c.rating))
                .sum(),
            comments_on_posts: t
                .comments
                .values()
                .filter(|c| own_posts.contains(&c.post_id))
                .map(|c| i64::from(c.rating))
                .sum(),
        })
    }

    async fn set_author_rating(&self, author_id: i64, rating: i32) -> Result<Option<Author>> {
        let mut t = self.tables.write().await;
        Ok(t.authors.get_mut(&author_id).map(|author| {
            author.rating = rating;
            author.clone()
        }))
    }
}

#[async_trait]
impl NewsRepo for MemoryStore {
    async fn create_news(&self, input: NewsInput) -> Result<News> {
        let mut t = self.tables.write().await;
        t.require_author(input.author_id)?;
        if t.news_name_taken(&input.name, None) {
            return Err(DomainError::Conflict(format!(
                "news `{}` already exists",
                input.name
            )));
        }
        let id = t.next_id("news");
        let news = input.into_news(id);
        t.news.insert(id, news.clone());
        Ok(news)
    }

    async fn get_news(&self, id: i64) -> Result<Option<News>> {
        Ok(self.tables.read().await.news.get(&id).cloned())
    }

    async fn update_news(&self, id: i64, input: NewsInput) -> Result<Option<News>> {
        let mut t = self.tables.write().await;
        if !t.news.contains_key(&id) {
            return Ok(None);
        }
        t.require_author(input.author_id)?;
        if t.news_name_taken(&input.name, Some(id)) {
            return Err(DomainError::Conflict(format!(
                "news `{}` already exists",
                input.name
            )));
        }
        let news = input.into_news(id);
        t.news.insert(id, news.clone());
        Ok(Some(news))
    }

    async fn delete_news(&self, id: i64) -> Result<bool> {
        Ok(self.tables.write().await.news.remove(&id).is_some())
    }

    async fn list_news(&self, page: Page) -> Result<Paginated<News>> {
        self.search_news(&NewsFilter::default(), page).await
    }

    async fn search_news(&self, filter: &NewsFilter, page: Page) -> Result<Paginated<News>> {
        let t = self.tables.read().await;
        let mut matching: Vec<News> = t
            .news
            .values()
            .filter(|n| filter.matches(n, t.author_username(n.author_id).unwrap_or_default()))
            .cloned()
            .collect();
        matching.sort_by(newest_news_first);
        Ok(Paginated::from_ordered(matching, page))
    }

    async fn published_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<News>> {
        let t = self.tables.read().await;
        let mut matching: Vec<News> = t
            .news
            .values()
            .filter(|n| start <= n.date_published && n.date_published < end)
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            a.date_published
                .cmp(&b.date_published)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(matching)
    }

    async fn count_by_author_between(
        &self,
        author_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64> {
        let t = self.tables.read().await;
        Ok(t.news
            .values()
            .filter(|n| n.author_id == author_id)
            .filter(|n| start <= n.date_published && n.date_published < end)
            .count() as i64)
    }
}

#[async_trait]
impl ArticleRepo for MemoryStore {
    async fn create_post(&self, input: PostInput) -> Result<Post> {
        let mut t = self.tables.write().await;
        t.require_author(input.author_id)?;
        for category_id in &input.category_ids {
            t.require_category(*category_id)?;
        }
        let post = Post {
            id: t.next_id("posts"),
            author_id: input.author_id,
            post_type: input.post_type,
            created: Utc::now(),
            title: input.title,
            text: input.text,
            rating: 0,
            category_ids: input.category_ids,
        };
        t.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn update_post(&self, id: i64, input: PostInput) -> Result<Option<Post>> {
        let mut t = self.tables.write().await;
        if !t.posts.contains_key(&id) {
            return Ok(None);
        }
        t.require_author(input.author_id)?;
        for category_id in &input.category_ids {
            t.require_category(*category_id)?;
        }
        Ok(t.posts.get_mut(&id).map(|post| {
            post.author_id = input.author_id;
            post.post_type = input.post_type;
            post.title = input.title;
            post.text = input.text;
            post.category_ids = input.category_ids;
            post.clone()
        }))
    }

    async fn delete_post(&self, id: i64) -> Result<bool> {
        let mut t = self.tables.write().await;
        if t.posts.remove(&id).is_none() {
            return Ok(false);
        }
        t.comments.retain(|_, c| c.post_id != id);
        Ok(true)
    }

    async fn list_posts(&self, post_type: Option<PostType>, page: Page) -> Result<Paginated<Post>> {
        let t = self.tables.read().await;
        let mut matching: Vec<Post> = t
            .posts
            .values()
            .filter(|p| post_type.map_or(true, |ty| p.post_type == ty))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| b.id.cmp(&a.id)));
        Ok(Paginated::from_ordered(matching, page))
    }

    async fn adjust_post_rating(&self, id: i64, delta: i32) -> Result<Option<i32>> {
        let mut t = self.tables.write().await;
        Ok(t.posts.get_mut(&id).map(|post| {
            post.rating = post.rating.saturating_add(delta);
            post.rating
        }))
    }

    async fn create_comment(&self, input: NewComment) -> Result<Comment> {
        let mut t = self.tables.write().await;
        if !t.posts.contains_key(&input.post_id) {
            return Err(missing_reference("post", input.post_id));
        }
        if !t.users.contains_key(&input.user_id) {
            return Err(missing_reference("user", input.user_id));
        }
        let comment = Comment {
            id: t.next_id("comments"),
            post_id: input.post_id,
            user_id: input.user_id,
            text: input.text,
            rating: 0,
        };
        t.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        let t = self.tables.read().await;
        Ok(t.comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn adjust_comment_rating(&self, id: i64, delta: i32) -> Result<Option<i32>> {
        let mut t = self.tables.write().await;
        Ok(t.comments.get_mut(&id).map(|comment| {
            comment.rating = comment.rating.saturating_add(delta);
            comment.rating
        }))
    }
}
