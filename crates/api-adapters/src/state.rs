use std::sync::Arc;

use axum::extract::FromRef;
use services::{ArticleService, AuthService, AuthorService, CatalogService, Censor, NewsService};

use crate::metrics::Metrics;

/// Shared by every handler; cloning copies the `Arc`s only.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub news: Arc<NewsService>,
    pub articles: Arc<ArticleService>,
    pub authors: Arc<AuthorService>,
    pub auth: Arc<AuthService>,
    /// Applied to news and article text on the way out.
    pub censor: Arc<Censor>,
    pub metrics: Arc<Metrics>,
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for Arc<Metrics> {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}
