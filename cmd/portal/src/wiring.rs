//! Feature-gated adapter selection.

use std::sync::Arc;

use configs::{DatabaseSettings, MailBackend, MailSettings};
use domains::{ArticleRepo, CatalogRepo, Mailer, NewsRepo, SubscriptionRepo, UserRepo};
use mail_adapters::LogMailer;
use storage_adapters::MemoryStore;
use tracing::{info, warn};

#[cfg(feature = "db-postgres")]
use secrecy::ExposeSecret;
#[cfg(feature = "db-postgres")]
use storage_adapters::PgStore;

#[cfg(feature = "mail-outbox")]
use mail_adapters::OutboxMailer;

/// One backing store seen through each port.
pub struct Stores {
    pub catalog: Arc<dyn CatalogRepo>,
    pub subscriptions: Arc<dyn SubscriptionRepo>,
    pub users: Arc<dyn UserRepo>,
    pub news: Arc<dyn NewsRepo>,
    pub articles: Arc<dyn ArticleRepo>,
}

impl Stores {
    fn from_store<S>(store: Arc<S>) -> Self
    where
        S: CatalogRepo + SubscriptionRepo + UserRepo + NewsRepo + ArticleRepo + 'static,
    {
        Self {
            catalog: store.clone(),
            subscriptions: store.clone(),
            users: store.clone(),
            news: store.clone(),
            articles: store,
        }
    }
}

/// Postgres when a URL is configured and compiled in, otherwise in memory.
pub async fn open_stores(db: &DatabaseSettings) -> anyhow::Result<Stores> {
    #[cfg(feature = "db-postgres")]
    {
        if let Some(url) = &db.url {
            let store = PgStore::connect(url.expose_secret(), db.max_connections).await?;
            if db.run_migrations {
                store.migrate().await?;
            }
            info!(max_connections = db.max_connections, "using postgres store");
            return Ok(Stores::from_store(Arc::new(store)));
        }
    }

    #[cfg(not(feature = "db-postgres"))]
    {
        if db.url.is_some() {
            warn!("database.url is set but postgres support is not compiled in");
        }
    }

    warn!("using the in-memory store; data is lost on restart");
    Ok(Stores::from_store(Arc::new(MemoryStore::new())))
}

pub fn build_mailer(mail: &MailSettings) -> anyhow::Result<Arc<dyn Mailer>> {
    match mail.backend {
        MailBackend::Log => {
            info!("mail goes to the log");
            Ok(Arc::new(LogMailer))
        }
        #[cfg(feature = "mail-outbox")]
        MailBackend::Outbox => {
            info!(dir = %mail.outbox_dir.display(), "mail goes to the outbox");
            Ok(Arc::new(OutboxMailer::new(&mail.outbox_dir)))
        }
        #[cfg(not(feature = "mail-outbox"))]
        MailBackend::Outbox => anyhow::bail!("mail.backend = \"outbox\" needs the mail-outbox feature"),
    }
}
