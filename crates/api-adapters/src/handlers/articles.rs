use axum::extract::State;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use domains::{preview, Comment, Paginated, Post, Vote};
use serde::{Deserialize, Serialize};
use services::{ArticleDraft, Censor};

use super::RatingBody;
use crate::error::ApiResult;
use crate::extract::{CurrentUser, Json, PageParams, Path, Query};
use crate::state::AppState;

/// List entry: the article without its full text.
#[derive(Debug, Serialize)]
pub struct ArticleSummary {
    pub id: i64,
    pub author_id: i64,
    pub created: DateTime<Utc>,
    pub title: String,
    pub preview: String,
    pub rating: i32,
    pub category_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub text: String,
}

fn censored(censor: &Censor, mut post: Post) -> Post {
    post.title = censor.apply(&post.title);
    post.text = censor.apply(&post.text);
    post
}

fn censored_comment(censor: &Censor, mut comment: Comment) -> Comment {
    comment.text = censor.apply(&comment.text);
    comment
}

pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Paginated<ArticleSummary>>> {
    let page = state.articles.list(params.number()).await?;
    Ok(Json(page.map(|post| ArticleSummary {
        id: post.id,
        author_id: post.author_id,
        created: post.created,
        title: state.censor.apply(&post.title),
        preview: preview(&state.censor.apply(&post.text)),
        rating: post.rating,
        category_ids: post.category_ids,
    })))
}

pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Post>> {
    let post = state.articles.get(id).await?;
    Ok(Json(censored(&state.censor, post)))
}

pub async fn create_article(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(draft): Json<ArticleDraft>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let post = state.articles.create(&user, draft).await?;
    Ok((StatusCode::CREATED, Json(censored(&state.censor, post))))
}

pub async fn update_article(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(draft): Json<ArticleDraft>,
) -> ApiResult<Json<Post>> {
    let post = state.articles.update(&user, id, draft).await?;
    Ok(Json(censored(&state.censor, post)))
}

pub async fn delete_article(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.articles.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn vote_article(state: AppState, id: i64, vote: Vote) -> ApiResult<Json<RatingBody>> {
    let rating = state.articles.vote_post(id, vote).await?;
    state.metrics.record_vote("article", vote);
    Ok(Json(RatingBody { id, rating }))
}

pub async fn like_article(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<RatingBody>> {
    vote_article(state, id, Vote::Like).await
}

pub async fn dislike_article(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<RatingBody>> {
    vote_article(state, id, Vote::Dislike).await
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<Comment>>> {
    let comments = state.articles.comments(id).await?;
    Ok(Json(
        comments
            .into_iter()
            .map(|c| censored_comment(&state.censor, c))
            .collect(),
    ))
}

pub async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<CommentBody>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let comment = state.articles.add_comment(&user, id, body.text).await?;
    Ok((StatusCode::CREATED, Json(censored_comment(&state.censor, comment))))
}

async fn vote_comment(state: AppState, id: i64, vote: Vote) -> ApiResult<Json<RatingBody>> {
    let rating = state.articles.vote_comment(id, vote).await?;
    state.metrics.record_vote("comment", vote);
    Ok(Json(RatingBody { id, rating }))
}

pub async fn like_comment(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<RatingBody>> {
    vote_comment(state, id, Vote::Like).await
}

pub async fn dislike_comment(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<RatingBody>> {
    vote_comment(state, id, Vote::Dislike).await
}
