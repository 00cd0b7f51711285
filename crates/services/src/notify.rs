//! New-article notices for category subscribers.

use std::sync::Arc;

use askama::Template;
use domains::{CatalogRepo, DomainError, Mailer, OutboundEmail, Post, Result, SubscriptionRepo};
use tracing::{instrument, warn};

/// Characters of article text quoted in a notice.
pub const EXCERPT_LENGTH: usize = 50;

#[derive(Template)]
#[template(source = "{{ title }}: {{ excerpt }}", ext = "txt")]
struct NoticeTemplate<'a> {
    title: &'a str,
    excerpt: &'a str,
}

pub struct ArticleNotifier {
    catalog: Arc<dyn CatalogRepo>,
    subscriptions: Arc<dyn SubscriptionRepo>,
    mailer: Arc<dyn Mailer>,
    from: String,
}

impl ArticleNotifier {
    pub fn new(
        catalog: Arc<dyn CatalogRepo>,
        subscriptions: Arc<dyn SubscriptionRepo>,
        mailer: Arc<dyn Mailer>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            subscriptions,
            mailer,
            from: from.into(),
        }
    }

    /// Mails every subscriber of every category the post is filed under.
    /// Returns the number of messages accepted by the mailer; delivery failures
    /// are logged and skipped.
    #[instrument(skip(self, post), fields(post_id = post.id))]
    pub async fn notify_new_article(&self, post: &Post) -> Result<usize> {
        let excerpt: String = post.text.chars().take(EXCERPT_LENGTH).collect();
        let body = NoticeTemplate {
            title: &post.title,
            excerpt: &excerpt,
        }
        .render()
        .map_err(DomainError::internal)?;

        let mut delivered = 0;
        for category_id in &post.category_ids {
            let Some(category) = self.catalog.get_category(*category_id).await? else {
                continue;
            };
            let subject = format!("New article in {}", category.name);
            for subscriber in self.subscriptions.category_subscribers(category.id).await? {
                if subscriber.email.trim().is_empty() {
                    continue;
                }
                let email = OutboundEmail {
                    from: self.from.clone(),
                    to: vec![subscriber.email.clone()],
                    subject: subject.clone(),
                    body: body.clone(),
                };
                match self.mailer.send(&email).await {
                    Ok(()) => delivered += 1,
                    Err(e) => warn!(error = %e, user_id = subscriber.id, "article notice not delivered"),
                }
            }
        }
        Ok(delivered)
    }
}
