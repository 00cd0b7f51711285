use axum::extract::State;
use axum::http::StatusCode;
use domains::filters::{ProductFilter, QueryParams};
use domains::{Category, NewCategory, Paginated, Product, ProductInput};
use serde::Serialize;

use crate::error::ApiResult;
use crate::extract::{page_param, CurrentUser, Json, Path, Query};
use crate::state::AppState;

/// `GET /products/?name__icontains=..&quantity__gt=..&price__lt=..&price__gt=..&page=..`
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<Paginated<Product>>> {
    let filter = ProductFilter::from_params(&params)?;
    let page = page_param(&params)?;
    Ok(Json(state.catalog.list_products(&filter, page).await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.catalog.get_product(id).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = state.catalog.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ProductInput>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.catalog.update_product(id, input).await?))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.catalog.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.catalog.list_categories().await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<NewCategory>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = state.catalog.create_category(input.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Also removes the category's products, article links and subscriptions.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.catalog.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct SubscriptionBody {
    pub category_id: i64,
    pub subscribed: bool,
}

pub async fn toggle_subscription(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<SubscriptionBody>> {
    let subscribed = state.catalog.toggle_subscription(&user, id).await?;
    Ok(Json(SubscriptionBody {
        category_id: id,
        subscribed,
    }))
}
