use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Actions gated behind an explicit grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    AddNews,
    ChangeNews,
    DeleteNews,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddNews => "add_news",
            Self::ChangeNews => "change_news",
            Self::DeleteNews => "delete_news",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add_news" => Ok(Self::AddNews),
            "change_news" => Ok(Self::ChangeNews),
            "delete_news" => Ok(Self::DeleteNews),
            other => Err(DomainError::validation(format!("unknown permission `{other}`"))),
        }
    }
}

/// An account that can log in, comment and subscribe to categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string, never the raw password
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub permissions: Vec<Permission>,
}

impl User {
    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Fails with `Forbidden` unless the user holds `permission`.
    pub fn require(&self, permission: Permission) -> crate::Result<()> {
        if self.has(permission) {
            Ok(())
        } else {
            Err(DomainError::Forbidden(format!(
                "{} lacks the `{permission}` permission",
                self.username
            )))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub permissions: Vec<Permission>,
}

/// Publishing profile attached one-to-one to a [`User`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub user_id: i64,
    /// Derived value, refreshed only by an explicit recomputation
    pub rating: i32,
}

/// The aggregates an author's rating is computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingTotals {
    /// Sum of the ratings of the author's posts
    pub posts: i64,
    /// Sum of the ratings of comments written by the author's user
    pub own_comments: i64,
    /// Sum of the ratings of comments left on the author's posts
    pub comments_on_posts: i64,
}

impl RatingTotals {
    pub fn author_rating(&self) -> i32 {
        let total = self.posts * 3 + self.own_comments + self.comments_on_posts;
        total.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
}
