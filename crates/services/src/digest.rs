//! Weekly news digest.
//!
//! One plain-text message summarising the current week's news is mailed to
//! every distinct subscriber address. The job never mutates the store.

use std::collections::BTreeSet;
use std::sync::Arc;

use askama::Template;
use chrono::{DateTime, Datelike, Duration, Utc};
use domains::{DomainError, Mailer, News, NewsRepo, OutboundEmail, Result, SubscriptionRepo};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::censor::Censor;

#[derive(Debug, Clone)]
pub struct DigestSettings {
    pub from: String,
    pub subject: String,
}

impl Default for DigestSettings {
    fn default() -> Self {
        Self {
            from: "noreply@example.com".into(),
            subject: "Weekly news digest".into(),
        }
    }
}

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DigestWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DigestWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

/// Monday 00:00 UTC of the week containing `now`, through the following Monday 00:00.
pub fn week_window(now: DateTime<Utc>) -> DigestWindow {
    let monday = now.date_naive() - Duration::days(i64::from(now.weekday().num_days_from_monday()));
    let start = monday
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(now);
    DigestWindow {
        start,
        end: start + Duration::days(7),
    }
}

/// Outcome of one digest run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigestReport {
    pub window: DigestWindow,
    pub news_count: usize,
    pub recipients: usize,
    pub delivered: usize,
    pub failed: usize,
}

struct DigestItem {
    title: String,
    body: String,
}

#[derive(Template)]
#[template(
    source = "Latest news:\n\n{% for item in items %}{{ item.title }}\n{{ item.body }}\n\n{% endfor %}",
    ext = "txt"
)]
struct DigestTemplate<'a> {
    items: &'a [DigestItem],
}

pub struct DigestService {
    news: Arc<dyn NewsRepo>,
    subscriptions: Arc<dyn SubscriptionRepo>,
    mailer: Arc<dyn Mailer>,
    censor: Censor,
    settings: DigestSettings,
}

impl DigestService {
    pub fn new(
        news: Arc<dyn NewsRepo>,
        subscriptions: Arc<dyn SubscriptionRepo>,
        mailer: Arc<dyn Mailer>,
        settings: DigestSettings,
    ) -> Self {
        Self {
            news,
            subscriptions,
            mailer,
            censor: Censor::default(),
            settings,
        }
    }

    pub fn with_censor(mut self, censor: Censor) -> Self {
        self.censor = censor;
        self
    }

    /// Builds and sends the digest for the week containing `now`.
    #[instrument(skip(self))]
    pub async fn run(&self, now: DateTime<Utc>) -> Result<DigestReport> {
        let window = week_window(now);
        let news = self.news.published_between(window.start, window.end).await?;
        let mut report = DigestReport {
            window,
            news_count: news.len(),
            recipients: 0,
            delivered: 0,
            failed: 0,
        };
        if news.is_empty() {
            info!("no news this week, digest skipped");
            return Ok(report);
        }

        let recipients: BTreeSet<String> = self
            .subscriptions
            .all_subscribers()
            .await?
            .into_iter()
            .map(|user| user.email)
            .filter(|email| !email.trim().is_empty())
            .collect();
        report.recipients = recipients.len();

        let body = self.render(&news)?;
        for address in recipients {
            let email = OutboundEmail {
                from: self.settings.from.clone(),
                to: vec![address],
                subject: self.settings.subject.clone(),
                body: body.clone(),
            };
            match self.mailer.send(&email).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(error = %e, recipient = %email.to[0], "digest not delivered");
                }
            }
        }

        info!(
            news = report.news_count,
            delivered = report.delivered,
            failed = report.failed,
            "digest sent"
        );
        Ok(report)
    }

    pub fn render(&self, news: &[News]) -> Result<String> {
        let items: Vec<DigestItem> = news
            .iter()
            .map(|n| DigestItem {
                title: self.censor.apply(&n.name),
                body: self.censor.apply(&n.text),
            })
            .collect();
        DigestTemplate { items: &items }
            .render()
            .map_err(DomainError::internal)
    }
}
