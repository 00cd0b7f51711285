use async_trait::async_trait;
use domains::{Mailer, OutboundEmail, Result};
use tracing::info;

/// Delivers nothing; every message becomes an `info` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        info!(
            from = %email.from,
            to = ?email.to,
            subject = %email.subject,
            bytes = email.body.len(),
            "mail sent"
        );
        Ok(())
    }
}
