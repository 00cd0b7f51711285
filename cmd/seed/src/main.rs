//! Loads a demo dataset into the configured Postgres database.
//!
//! Creates an `editor` account holding every news permission, an author profile
//! for it, a few categories and products, two news items and one article.
//! Rows that already exist are left alone, so the command can be re-run.
//!
//! The editor password is read from `SEED_EDITOR_PASSWORD`.

use std::future::Future;
use std::sync::Arc;

use anyhow::{bail, Context};
use auth_adapters::Argon2Hasher;
use configs::Settings;
use domains::{DomainError, Permission, ProductInput, SubscriptionRepo, User, UserRepo};
use secrecy::ExposeSecret;
use services::{
    ArticleDraft, ArticleService, AuthService, CatalogService, NewsDraft, NewsService, Registration,
};
use storage_adapters::PgStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

const EDITOR: &str = "editor";

/// Runs `op`, treating a unique-name conflict as "already seeded".
async fn once<T>(what: &str, op: impl Future<Output = Result<T, DomainError>>) -> anyhow::Result<Option<T>> {
    match op.await {
        Ok(value) => {
            info!(what, "created");
            Ok(Some(value))
        }
        Err(DomainError::Conflict(_)) => {
            info!(what, "already present");
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("failed to seed {what}")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::load().context("failed to load settings")?;
    let Some(url) = settings.database.url.as_ref() else {
        bail!("database.url is not set (PORTAL__DATABASE__URL)");
    };
    let password = std::env::var("SEED_EDITOR_PASSWORD").context("SEED_EDITOR_PASSWORD is not set")?;

    let store = Arc::new(PgStore::connect(url.expose_secret(), settings.database.max_connections).await?);
    store.migrate().await?;

    let auth = AuthService::new(store.clone(), Arc::new(Argon2Hasher::new()));
    let catalog = CatalogService::new(store.clone(), store.clone());
    let news = NewsService::new(store.clone(), store.clone());
    let articles = ArticleService::new(store.clone(), store.clone(), store.clone());

    // 1. Editor account and author profile
    once(
        "user editor",
        auth.register(Registration {
            username: EDITOR.into(),
            email: "editor@example.com".into(),
            password,
            permissions: vec![Permission::AddNews, Permission::ChangeNews, Permission::DeleteNews],
        }),
    )
    .await?;
    let editor: User = store
        .find_user_by_username(EDITOR)
        .await?
        .context("editor account missing after seeding")?;
    let author_id = match once("author profile", store.create_author(editor.id)).await? {
        Some(author) => author.id,
        None => {
            info!("editor already has an author profile; skipping news and articles");
            return Ok(());
        }
    };

    // 2. Catalog
    let mut category_ids = Vec::new();
    for name in ["Books", "Electronics", "Garden"] {
        if let Some(category) = once(name, catalog.create_category(name.into())).await? {
            category_ids.push(category.id);
        }
    }
    let products = [
        ("Rust in Action", "A hands-on tour of systems programming.", 12, 39.9),
        ("USB-C Hub", "Seven ports, one cable, no drivers needed.", 40, 24.5),
        ("Pruning Shears", "Hardened steel blades with a safety lock.", 7, 15.0),
    ];
    for ((name, description, quantity, price), category_id) in products.into_iter().zip(&category_ids) {
        once(
            name,
            catalog.create_product(ProductInput {
                name: name.into(),
                description: description.into(),
                quantity,
                price,
                category_id: *category_id,
            }),
        )
        .await?;
    }

    // 3. Content
    for (name, text) in [
        ("Portal opens", "The portal is live with its first catalog."),
        ("Weekly digest", "Subscribe to a category to get the Monday digest."),
    ] {
        once(
            name,
            news.create(
                &editor,
                NewsDraft {
                    name: name.into(),
                    text: text.into(),
                    author_id,
                    date_published: None,
                },
            ),
        )
        .await?;
    }
    once(
        "article",
        articles.create(
            &editor,
            ArticleDraft {
                author_id,
                title: "Choosing a USB-C hub".into(),
                text: "Port count matters less than power delivery. Check the wattage first.".into(),
                category_ids: category_ids.iter().skip(1).take(1).copied().collect(),
            },
        ),
    )
    .await?;

    if let Some(first) = category_ids.first() {
        store.toggle_subscription(*first, editor.id).await?;
    }

    info!("seeding finished");
    Ok(())
}
