use axum::extract::State;
use axum::http::StatusCode;
use domains::Author;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extract::{Json, Path};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewAuthorBody {
    pub user_id: i64,
}

pub async fn create_author(
    State(state): State<AppState>,
    Json(body): Json<NewAuthorBody>,
) -> ApiResult<(StatusCode, Json<Author>)> {
    let author = state.authors.create_author(body.user_id).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

pub async fn get_author(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Author>> {
    Ok(Json(state.authors.get_author(id).await?))
}

/// Recomputes and stores the rating from current post and comment ratings.
pub async fn update_rating(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Author>> {
    Ok(Json(state.authors.update_rating(id).await?))
}
