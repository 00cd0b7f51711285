//! Route table and middleware stack.
//!
//! Paths keep their trailing slash (`/products/`, `/products/{id}/`); reads are
//! `GET`, every mutation is a `POST` to an action path.

use std::time::Duration;

use axum::extract::Request;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info_span;

use crate::handlers::{articles, authors, catalog, news, ops};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let x_request_id = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(catalog_routes())
        .merge(news_routes())
        .merge(article_routes())
        .merge(author_routes())
        .route("/health/", get(ops::health))
        .route("/metrics", get(ops::metrics))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    info_span!(
                        "http",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(cors_policy()),
        )
        .with_state(state)
}

pub fn cors_policy() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}

fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products/", get(catalog::list_products))
        .route("/products/create/", post(catalog::create_product))
        .route("/products/{id}/", get(catalog::get_product))
        .route("/products/{id}/update/", post(catalog::update_product))
        .route("/products/{id}/delete/", post(catalog::delete_product))
        .route("/categories/", get(catalog::list_categories))
        .route("/categories/create/", post(catalog::create_category))
        .route("/categories/{id}/delete/", post(catalog::delete_category))
        .route("/categories/{id}/subscribe/", post(catalog::toggle_subscription))
}

fn news_routes() -> Router<AppState> {
    Router::new()
        .route("/news/", get(news::list_news))
        .route("/news/search/", get(news::search_news))
        .route("/news/create/", post(news::create_news))
        .route("/news/{id}/", get(news::get_news))
        .route("/news/{id}/edit/", post(news::update_news))
        .route("/news/{id}/delete/", post(news::delete_news))
}

fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/articles/", get(articles::list_articles))
        .route("/articles/create/", post(articles::create_article))
        .route("/articles/{id}/", get(articles::get_article))
        .route("/articles/{id}/edit/", post(articles::update_article))
        .route("/articles/{id}/delete/", post(articles::delete_article))
        .route("/articles/{id}/like/", post(articles::like_article))
        .route("/articles/{id}/dislike/", post(articles::dislike_article))
        .route(
            "/articles/{id}/comments/",
            get(articles::list_comments).post(articles::add_comment),
        )
        .route("/comments/{id}/like/", post(articles::like_comment))
        .route("/comments/{id}/dislike/", post(articles::dislike_comment))
}

fn author_routes() -> Router<AppState> {
    Router::new()
        .route("/authors/create/", post(authors::create_author))
        .route("/authors/{id}/", get(authors::get_author))
        .route("/authors/{id}/rating/", post(authors::update_rating))
}
