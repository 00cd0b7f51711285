use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A short dated announcement written by an [`Author`](super::Author).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct News {
    pub id: i64,
    /// Unique headline
    pub name: String,
    pub text: String,
    pub date_published: DateTime<Utc>,
    pub author_id: i64,
}

/// Writable fields of a [`News`] item. The publication date is resolved by the
/// service before it reaches the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsInput {
    pub name: String,
    pub text: String,
    pub date_published: DateTime<Utc>,
    pub author_id: i64,
}

impl NewsInput {
    pub fn into_news(self, id: i64) -> News {
        News {
            id,
            name: self.name,
            text: self.text,
            date_published: self.date_published,
            author_id: self.author_id,
        }
    }
}
