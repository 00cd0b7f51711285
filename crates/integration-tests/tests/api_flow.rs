//! End to end over HTTP: subscribe, publish, run the digest, read the metrics.

use std::sync::Arc;

use api_adapters::{create_router, AppState, Metrics};
use auth_adapters::Argon2Hasher;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use domains::{Permission, UserRepo};
use mail_adapters::MemoryMailer;
use serde_json::{json, Value};
use services::{
    ArticleService, AuthService, AuthorService, CatalogService, Censor, DigestService,
    DigestSettings, NewsService, Registration,
};
use storage_adapters::MemoryStore;
use tower::ServiceExt;

async fn call(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn authed_post(uri: &str, user: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(
            header::AUTHORIZATION,
            format!("Basic {}", STANDARD.encode(format!("{user}:pw-{user}"))),
        )
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn published_news_reaches_subscribers_in_the_digest() {
    let store = Arc::new(MemoryStore::new());
    let mailer = Arc::new(MemoryMailer::new());
    let metrics = Arc::new(Metrics::new());
    let auth = Arc::new(AuthService::new(store.clone(), Arc::new(Argon2Hasher::new())));

    for (name, permissions) in [("editor", vec![Permission::AddNews]), ("reader", vec![])] {
        auth.register(Registration {
            username: name.into(),
            email: format!("{name}@example.com"),
            password: format!("pw-{name}"),
            permissions,
        })
        .await
        .unwrap();
    }
    let editor = store.find_user_by_username("editor").await.unwrap().unwrap();
    let author = store.create_author(editor.id).await.unwrap();

    let router = create_router(AppState {
        catalog: Arc::new(CatalogService::new(store.clone(), store.clone())),
        news: Arc::new(NewsService::new(store.clone(), store.clone())),
        articles: Arc::new(ArticleService::new(store.clone(), store.clone(), store.clone())),
        authors: Arc::new(AuthorService::new(store.clone())),
        auth,
        censor: Arc::new(Censor::default()),
        metrics: metrics.clone(),
    });

    let (status, category) = call(
        &router,
        authed_post("/categories/create/", "reader", json!({ "name": "Tech" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = call(
        &router,
        authed_post(&format!("/categories/{}/subscribe/", category["id"]), "reader", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &router,
        authed_post(
            "/news/create/",
            "editor",
            json!({ "name": "Launch", "text": "We launched today", "author_id": author.id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let digest = DigestService::new(store.clone(), store.clone(), mailer.clone(), DigestSettings::default());
    let report = digest.run(Utc::now()).await.unwrap();
    metrics.record_digest(&report);

    let sent = mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["reader@example.com".to_string()]);
    assert!(sent[0].body.contains("Launch\nWe launched today"));

    let response = router
        .clone()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let text = String::from_utf8(to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();
    assert!(text.contains(r#"portal_digest_emails_total{outcome="delivered"} 1"#));
}
