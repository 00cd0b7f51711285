//! News publication, editing and search.

use std::sync::Arc;

use chrono::{DateTime, Days, Utc};
use domains::filters::NewsFilter;
use domains::{
    DomainError, News, NewsInput, NewsRepo, Page, Paginated, Permission, Result, User, UserRepo,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::validation::{distinct, max_chars, required};

pub const NEWS_PER_PAGE: u32 = 10;
pub const NEWS_NAME_MAX: usize = 50;
pub const DEFAULT_DAILY_LIMIT: u32 = 3;

/// Submitted fields of a news item. A missing publication date means "now".
#[derive(Debug, Clone, Deserialize)]
pub struct NewsDraft {
    pub name: String,
    pub text: String,
    pub author_id: i64,
    pub date_published: Option<DateTime<Utc>>,
}

pub struct NewsService {
    news: Arc<dyn NewsRepo>,
    users: Arc<dyn UserRepo>,
    daily_limit: u32,
}

impl NewsService {
    pub fn new(news: Arc<dyn NewsRepo>, users: Arc<dyn UserRepo>) -> Self {
        Self {
            news,
            users,
            daily_limit: DEFAULT_DAILY_LIMIT,
        }
    }

    /// Maximum number of items one author may publish per UTC day.
    pub fn with_daily_limit(mut self, limit: u32) -> Self {
        self.daily_limit = limit;
        self
    }

    #[instrument(skip(self, actor, draft), fields(user_id = actor.id, name = %draft.name))]
    pub async fn create(&self, actor: &User, draft: NewsDraft) -> Result<News> {
        actor.require(Permission::AddNews)?;
        validate_draft(&draft)?;
        self.ensure_author(draft.author_id).await?;

        let now = Utc::now();
        let (day_start, day_end) = day_bounds(now);
        let published_today = self
            .news
            .count_by_author_between(draft.author_id, day_start, day_end)
            .await?;
        if published_today >= i64::from(self.daily_limit) {
            warn!(published_today, "daily publication limit reached");
            return Err(DomainError::RateLimited(format!(
                "author {} already published {published_today} news today",
                draft.author_id
            )));
        }

        let news = self.news.create_news(into_input(draft, now)).await?;
        info!(news_id = news.id, "news published");
        Ok(news)
    }

    pub async fn get(&self, id: i64) -> Result<News> {
        self.news
            .get_news(id)
            .await?
            .ok_or(DomainError::NotFound("news", id))
    }

    #[instrument(skip(self, actor, draft), fields(user_id = actor.id))]
    pub async fn update(&self, actor: &User, id: i64, draft: NewsDraft) -> Result<News> {
        actor.require(Permission::ChangeNews)?;
        validate_draft(&draft)?;
        self.ensure_author(draft.author_id).await?;
        let current = self.get(id).await?;

        let date_published = draft.date_published.unwrap_or(current.date_published);
        let input = NewsInput {
            name: draft.name,
            text: draft.text,
            date_published,
            author_id: draft.author_id,
        };
        self.news
            .update_news(id, input)
            .await?
            .ok_or(DomainError::NotFound("news", id))
    }

    #[instrument(skip(self, actor), fields(user_id = actor.id))]
    pub async fn delete(&self, actor: &User, id: i64) -> Result<()> {
        actor.require(Permission::DeleteNews)?;
        if !self.news.delete_news(id).await? {
            return Err(DomainError::NotFound("news", id));
        }
        info!(news_id = id, "news deleted");
        Ok(())
    }

    pub async fn list(&self, page: u32) -> Result<Paginated<News>> {
        self.news.list_news(Page::new(page, NEWS_PER_PAGE)).await
    }

    pub async fn search(&self, filter: &NewsFilter, page: u32) -> Result<Paginated<News>> {
        self.news
            .search_news(filter, Page::new(page, NEWS_PER_PAGE))
            .await
    }

    async fn ensure_author(&self, author_id: i64) -> Result<()> {
        match self.users.get_author(author_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::validation(format!(
                "author {author_id} does not exist"
            ))),
        }
    }
}

fn validate_draft(draft: &NewsDraft) -> Result<()> {
    required("name", &draft.name)?;
    max_chars("name", &draft.name, NEWS_NAME_MAX)?;
    required("text", &draft.text)?;
    distinct("name", &draft.name, "text", &draft.text)
}

fn into_input(draft: NewsDraft, now: DateTime<Utc>) -> NewsInput {
    NewsInput {
        name: draft.name,
        text: draft.text,
        date_published: draft.date_published.unwrap_or(now),
        author_id: draft.author_id,
    }
}

/// `[00:00, next 00:00)` of the UTC day containing `now`.
fn day_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(now);
    let end = start.checked_add_days(Days::new(1)).unwrap_or(start);
    (start, end)
}
