use axum::extract::State;
use axum::http::StatusCode;
use domains::filters::{NewsFilter, QueryParams};
use domains::{News, Paginated};
use services::{Censor, NewsDraft};

use crate::error::ApiResult;
use crate::extract::{page_param, CurrentUser, Json, PageParams, Path, Query};
use crate::state::AppState;

fn censored(censor: &Censor, mut news: News) -> News {
    news.name = censor.apply(&news.name);
    news.text = censor.apply(&news.text);
    news
}

pub async fn list_news(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Paginated<News>>> {
    let page = state.news.list(params.number()).await?;
    Ok(Json(page.map(|n| censored(&state.censor, n))))
}

/// `GET /news/search/?name__icontains=..&author__icontains=..&date_published__gt=..`
pub async fn search_news(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<Paginated<News>>> {
    let filter = NewsFilter::from_params(&params)?;
    let page = state.news.search(&filter, page_param(&params)?).await?;
    Ok(Json(page.map(|n| censored(&state.censor, n))))
}

pub async fn get_news(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<News>> {
    let news = state.news.get(id).await?;
    Ok(Json(censored(&state.censor, news)))
}

pub async fn create_news(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(draft): Json<NewsDraft>,
) -> ApiResult<(StatusCode, Json<News>)> {
    let news = state.news.create(&user, draft).await?;
    Ok((StatusCode::CREATED, Json(censored(&state.censor, news))))
}

pub async fn update_news(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(draft): Json<NewsDraft>,
) -> ApiResult<Json<News>> {
    let news = state.news.update(&user, id, draft).await?;
    Ok(Json(censored(&state.censor, news)))
}

pub async fn delete_news(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.news.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
