//! # Portal binary
//!
//! Assembles the application from settings and compile-time features, serves
//! the HTTP API and runs the weekly digest in the background.

mod scheduler;
mod wiring;

use std::sync::Arc;

use anyhow::Context;
use api_adapters::{create_router, AppState, Metrics};
use auth_adapters::Argon2Hasher;
use configs::{LogFormat, LogSettings, Settings};
use services::{
    ArticleNotifier, ArticleService, AuthService, AuthorService, CatalogService, Censor,
    DigestService, DigestSettings, NewsService, WeeklySchedule,
};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let registry = tracing_subscriber::registry().with(filter);
    match log.format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load settings")?;
    init_tracing(&settings.log);

    // 1. Adapters
    let stores = wiring::open_stores(&settings.database).await?;
    let mailer = wiring::build_mailer(&settings.mail)?;
    let censor = Censor::new(settings.content.banned_words.iter().cloned());
    let metrics = Arc::new(Metrics::new());

    // 2. Services
    let notifier = ArticleNotifier::new(
        stores.catalog.clone(),
        stores.subscriptions.clone(),
        mailer.clone(),
        settings.mail.from.clone(),
    );
    let state = AppState {
        catalog: Arc::new(CatalogService::new(stores.catalog.clone(), stores.subscriptions.clone())),
        news: Arc::new(
            NewsService::new(stores.news.clone(), stores.users.clone())
                .with_daily_limit(settings.content.news_daily_limit),
        ),
        articles: Arc::new(
            ArticleService::new(stores.articles.clone(), stores.catalog.clone(), stores.users.clone())
                .with_notifier(notifier),
        ),
        authors: Arc::new(AuthorService::new(stores.users.clone())),
        auth: Arc::new(AuthService::new(stores.users.clone(), Arc::new(Argon2Hasher::new()))),
        censor: Arc::new(censor.clone()),
        metrics: metrics.clone(),
    };

    // 3. Weekly digest
    let digest_job = if settings.digest.enabled {
        let schedule = WeeklySchedule::parse(
            &settings.digest.weekday,
            settings.digest.hour,
            settings.digest.minute,
        )?;
        let digest = DigestService::new(
            stores.news.clone(),
            stores.subscriptions.clone(),
            mailer.clone(),
            DigestSettings {
                from: settings.mail.from.clone(),
                subject: settings.digest.subject.clone(),
            },
        )
        .with_censor(censor);
        Some(tokio::spawn(scheduler::run_weekly(digest, schedule, metrics)))
    } else {
        info!("weekly digest disabled");
        None
    };

    // 4. HTTP
    let addr = settings.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "portal listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(job) = digest_job {
        job.abort();
    }
    info!("portal stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
