//! Extractors whose rejections render through [`ApiError`].

use std::sync::Arc;

use axum::extract::{FromRef, FromRequest, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use domains::filters::QueryParams;
use domains::{DomainError, User};
use serde::{Deserialize, Serialize};
use services::AuthService;

use crate::error::ApiError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Query<T>(pub T);

/// `?page=N`, 1-based.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
}

impl PageParams {
    pub fn number(&self) -> u32 {
        self.page.unwrap_or(1)
    }
}

/// Reads `page` out of a raw parameter map that also carries filter keys.
pub fn page_param(params: &QueryParams) -> Result<u32, DomainError> {
    match params.get("page").map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse()
            .map_err(|_| DomainError::validation(format!("`page` must be a positive number, got `{raw}`"))),
        None => Ok(1),
    }
}

/// The user named by HTTP Basic credentials.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let (username, password) = basic_credentials(&parts.headers)?;
        let auth = Arc::<AuthService>::from_ref(state);
        let user = auth.authenticate(&username, &password).await?;
        Ok(Self(user))
    }
}

fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), DomainError> {
    let unauthorized = |msg: &str| DomainError::Unauthorized(msg.to_string());

    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized("credentials required"))?
        .to_str()
        .map_err(|_| unauthorized("malformed authorization header"))?;
    let encoded = value
        .strip_prefix("Basic ")
        .ok_or_else(|| unauthorized("only Basic authorization is supported"))?;
    let decoded = STANDARD
        .decode(encoded.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| unauthorized("malformed authorization header"))?;
    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| unauthorized("malformed authorization header"))?;

    Ok((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn decodes_basic_credentials() {
        let header = format!("Basic {}", STANDARD.encode("editor:s3cret:with-colon"));
        let (user, pass) = basic_credentials(&with_auth(&header)).unwrap();
        assert_eq!(user, "editor");
        assert_eq!(pass, "s3cret:with-colon");
    }

    #[test]
    fn rejects_missing_or_foreign_schemes() {
        assert!(matches!(
            basic_credentials(&HeaderMap::new()),
            Err(DomainError::Unauthorized(_))
        ));
        assert!(matches!(
            basic_credentials(&with_auth("Bearer abc")),
            Err(DomainError::Unauthorized(_))
        ));
        assert!(matches!(
            basic_credentials(&with_auth("Basic !!!")),
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[test]
    fn page_defaults_to_first() {
        let mut params = QueryParams::new();
        assert_eq!(page_param(&params).unwrap(), 1);
        params.insert("page".into(), "3".into());
        assert_eq!(page_param(&params).unwrap(), 3);
        params.insert("page".into(), "last".into());
        assert!(page_param(&params).is_err());
    }
}
