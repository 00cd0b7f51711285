use std::sync::Arc;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use domains::DomainError;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::extract::Json;
use crate::metrics::Metrics;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn metrics(State(metrics): State<Arc<Metrics>>) -> ApiResult<impl IntoResponse> {
    let body = metrics.encode().map_err(DomainError::internal)?;
    Ok((
        [(CONTENT_TYPE, "application/openmetrics-text; version=1.0.0; charset=utf-8")],
        body,
    ))
}
