//! Articles, comments and their ratings.

use std::sync::Arc;

use domains::{
    ArticleRepo, CatalogRepo, Comment, DomainError, NewComment, Page, Paginated, Permission, Post,
    PostInput, PostType, Result, User, UserRepo, Vote,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::notify::ArticleNotifier;
use crate::validation::{distinct, max_chars, required};

pub const ARTICLES_PER_PAGE: u32 = 10;
pub const ARTICLE_TITLE_MAX: usize = 200;

/// Submitted fields of an article.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleDraft {
    pub author_id: i64,
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub category_ids: Vec<i64>,
}

pub struct ArticleService {
    articles: Arc<dyn ArticleRepo>,
    catalog: Arc<dyn CatalogRepo>,
    users: Arc<dyn UserRepo>,
    notifier: Option<ArticleNotifier>,
}

impl ArticleService {
    pub fn new(
        articles: Arc<dyn ArticleRepo>,
        catalog: Arc<dyn CatalogRepo>,
        users: Arc<dyn UserRepo>,
    ) -> Self {
        Self {
            articles,
            catalog,
            users,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: ArticleNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    #[instrument(skip(self, actor, draft), fields(user_id = actor.id, title = %draft.title))]
    pub async fn create(&self, actor: &User, draft: ArticleDraft) -> Result<Post> {
        actor.require(Permission::AddNews)?;
        let input = self.check_draft(draft).await?;
        let post = self.articles.create_post(input).await?;
        info!(post_id = post.id, "article published");

        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.notify_new_article(&post).await {
                warn!(error = %e, post_id = post.id, "subscriber notification failed");
            }
        }
        Ok(post)
    }

    pub async fn get(&self, id: i64) -> Result<Post> {
        self.articles
            .get_post(id)
            .await?
            .ok_or(DomainError::NotFound("article", id))
    }

    #[instrument(skip(self, actor, draft), fields(user_id = actor.id))]
    pub async fn update(&self, actor: &User, id: i64, draft: ArticleDraft) -> Result<Post> {
        actor.require(Permission::ChangeNews)?;
        let current = self.get(id).await?;
        let mut input = self.check_draft(draft).await?;
        input.post_type = current.post_type;
        self.articles
            .update_post(id, input)
            .await?
            .ok_or(DomainError::NotFound("article", id))
    }

    #[instrument(skip(self, actor), fields(user_id = actor.id))]
    pub async fn delete(&self, actor: &User, id: i64) -> Result<()> {
        actor.require(Permission::DeleteNews)?;
        if !self.articles.delete_post(id).await? {
            return Err(DomainError::NotFound("article", id));
        }
        info!(post_id = id, "article deleted");
        Ok(())
    }

    /// Articles only; news-type posts are not listed here.
    pub async fn list(&self, page: u32) -> Result<Paginated<Post>> {
        self.articles
            .list_posts(Some(PostType::Post), Page::new(page, ARTICLES_PER_PAGE))
            .await
    }

    /// Applies one like or dislike and returns the stored rating.
    #[instrument(skip(self))]
    pub async fn vote_post(&self, id: i64, vote: Vote) -> Result<i32> {
        self.articles
            .adjust_post_rating(id, vote.delta())
            .await?
            .ok_or(DomainError::NotFound("article", id))
    }

    #[instrument(skip(self, actor, text), fields(user_id = actor.id))]
    pub async fn add_comment(&self, actor: &User, post_id: i64, text: String) -> Result<Comment> {
        required("text", &text)?;
        self.get(post_id).await?;
        self.articles
            .create_comment(NewComment {
                post_id,
                user_id: actor.id,
                text,
            })
            .await
    }

    pub async fn comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        self.get(post_id).await?;
        self.articles.list_comments(post_id).await
    }

    #[instrument(skip(self))]
    pub async fn vote_comment(&self, id: i64, vote: Vote) -> Result<i32> {
        self.articles
            .adjust_comment_rating(id, vote.delta())
            .await?
            .ok_or(DomainError::NotFound("comment", id))
    }

    async fn check_draft(&self, draft: ArticleDraft) -> Result<PostInput> {
        required("title", &draft.title)?;
        max_chars("title", &draft.title, ARTICLE_TITLE_MAX)?;
        required("text", &draft.text)?;
        distinct("title", &draft.title, "text", &draft.text)?;

        if self.users.get_author(draft.author_id).await?.is_none() {
            return Err(DomainError::validation(format!(
                "author {} does not exist",
                draft.author_id
            )));
        }

        let mut category_ids = draft.category_ids;
        category_ids.sort_unstable();
        category_ids.dedup();
        for id in &category_ids {
            if self.catalog.get_category(*id).await?.is_none() {
                return Err(DomainError::validation(format!("category {id} does not exist")));
            }
        }

        Ok(PostInput {
            author_id: draft.author_id,
            post_type: PostType::Post,
            title: draft.title,
            text: draft.text,
            category_ids,
        })
    }
}
