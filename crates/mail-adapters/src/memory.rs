use std::collections::HashSet;

use async_trait::async_trait;
use domains::{DomainError, Mailer, OutboundEmail, Result};
use tokio::sync::Mutex;

/// Records every accepted message. Addresses registered with
/// [`MemoryMailer::reject`] fail delivery.
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutboundEmail>>,
    rejected: Mutex<HashSet<String>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn reject(&self, address: impl Into<String>) {
        self.rejected.lock().await.insert(address.into());
    }

    pub async fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let rejected = self.rejected.lock().await;
        if let Some(address) = email.to.iter().find(|to| rejected.contains(*to)) {
            return Err(DomainError::Internal(format!("mailbox {address} unavailable")));
        }
        drop(rejected);
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}
