//! Request handlers, one module per resource.
//!
//! Handlers only translate between HTTP and the services: they pull typed
//! input out of the request, call one service method and wrap the result.

pub mod articles;
pub mod authors;
pub mod catalog;
pub mod news;
pub mod ops;

use serde::Serialize;

/// Body of like/dislike responses.
#[derive(Debug, Serialize)]
pub struct RatingBody {
    pub id: i64,
    pub rating: i32,
}
