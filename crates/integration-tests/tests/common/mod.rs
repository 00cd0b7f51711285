//! Shared fixtures: every service wired over one [`MemoryStore`] and a
//! recording [`MemoryMailer`].

#![allow(dead_code)]

use std::sync::Arc;

use domains::{Author, NewUser, Permission, User, UserRepo};
use mail_adapters::MemoryMailer;
use services::{
    ArticleNotifier, ArticleService, AuthorService, CatalogService, Censor, DigestService,
    DigestSettings, NewsService,
};
use storage_adapters::MemoryStore;

pub const FROM: &str = "TMV@example.com";

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<MemoryMailer>,
    pub catalog: CatalogService,
    pub news: NewsService,
    pub articles: ArticleService,
    pub authors: AuthorService,
    pub digest: DigestService,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(MemoryMailer::new());
        let notifier = ArticleNotifier::new(store.clone(), store.clone(), mailer.clone(), FROM);
        Self {
            catalog: CatalogService::new(store.clone(), store.clone()),
            news: NewsService::new(store.clone(), store.clone()),
            articles: ArticleService::new(store.clone(), store.clone(), store.clone())
                .with_notifier(notifier),
            authors: AuthorService::new(store.clone()),
            digest: DigestService::new(
                store.clone(),
                store.clone(),
                mailer.clone(),
                DigestSettings {
                    from: FROM.into(),
                    subject: "Weekly news digest".into(),
                },
            )
            .with_censor(Censor::new(["darn"])),
            store,
            mailer,
        }
    }

    /// Stores a user directly; these scenarios never check passwords.
    pub async fn user(&self, username: &str, email: &str, permissions: Vec<Permission>) -> User {
        self.store
            .create_user(NewUser {
                username: username.into(),
                email: email.into(),
                password_hash: "unused".into(),
                permissions,
            })
            .await
            .unwrap()
    }

    /// A user holding every news permission, plus its author profile.
    pub async fn editor(&self, username: &str) -> (User, Author) {
        let user = self
            .user(
                username,
                &format!("{username}@example.com"),
                vec![Permission::AddNews, Permission::ChangeNews, Permission::DeleteNews],
            )
            .await;
        let author = self.authors.create_author(user.id).await.unwrap();
        (user, author)
    }
}
