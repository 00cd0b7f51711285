use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use domains::{DomainError, Mailer, OutboundEmail, Result};
use tokio::fs;
use tracing::debug;

/// Spools messages as RFC 5322-style text files under `root/YYYY-MM-DD/`.
pub struct OutboxMailer {
    /// Root directory of the spool (e.g., "./data/outbox")
    root_path: PathBuf,
    counter: AtomicU64,
}

impl OutboxMailer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Generates a dated path: "2024-05-13/20240513T080000.123456Z-0001.eml"
    fn message_path(&self) -> PathBuf {
        let now = Utc::now();
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        let mut path = self.root_path.clone();
        path.push(now.format("%Y-%m-%d").to_string());
        path.push(format!("{}-{seq:04}.eml", now.format("%Y%m%dT%H%M%S%.6fZ")));
        path
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }
}

/// Folds CR and LF into spaces so a value always stays on its own header line.
fn header_value(raw: &str) -> String {
    raw.replace(['\r', '\n'], " ")
}

fn render(email: &OutboundEmail) -> String {
    let to: Vec<String> = email.to.iter().map(|addr| header_value(addr)).collect();
    format!(
        "From: {}\r\nTo: {}\r\nSubject: {}\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}",
        header_value(&email.from),
        to.join(", "),
        header_value(&email.subject),
        email.body
    )
}

#[async_trait]
impl Mailer for OutboxMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let target_path = self.message_path();
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).await.map_err(DomainError::internal)?;
        }
        fs::write(&target_path, render(email))
            .await
            .map_err(DomainError::internal)?;
        debug!(path = %target_path.display(), "mail spooled");
        Ok(())
    }
}
