use serde::{Deserialize, Serialize};

/// A plain-text message handed to a [`Mailer`](crate::ports::Mailer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}
