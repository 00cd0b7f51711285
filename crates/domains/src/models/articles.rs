use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Number of characters kept by [`Post::preview`].
pub const PREVIEW_LENGTH: usize = 124;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    News,
    Post,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Post => "post",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "news" => Ok(Self::News),
            "post" => Ok(Self::Post),
            other => Err(DomainError::validation(format!("unknown post type `{other}`"))),
        }
    }
}

/// Long-form article, filed under any number of categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub post_type: PostType,
    pub created: DateTime<Utc>,
    pub title: String,
    pub text: String,
    /// Mutated only through like/dislike
    pub rating: i32,
    pub category_ids: Vec<i64>,
}

impl Post {
    /// First [`PREVIEW_LENGTH`] characters, with an ellipsis when truncated.
    pub fn preview(&self) -> String {
        preview(&self.text)
    }
}

pub fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_LENGTH {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(PREVIEW_LENGTH).collect();
        out.push_str("...");
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostInput {
    pub author_id: i64,
    pub post_type: PostType,
    pub title: String,
    pub text: String,
    pub category_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub text: String,
    /// Mutated only through like/dislike
    pub rating: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub post_id: i64,
    pub user_id: i64,
    pub text: String,
}

/// Direction of a rating change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Like,
    Dislike,
}

impl Vote {
    pub fn delta(&self) -> i32 {
        match self {
            Self::Like => 1,
            Self::Dislike => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
        }
    }
}
