//! Router-level tests: real services over the in-memory store, driven through
//! `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use api_adapters::{create_router, AppState, Metrics};
use auth_adapters::Argon2Hasher;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use domains::{Permission, UserRepo};
use mail_adapters::MemoryMailer;
use serde_json::{json, Value};
use services::{
    ArticleNotifier, ArticleService, AuthService, AuthorService, CatalogService, Censor,
    NewsService, Registration,
};
use storage_adapters::MemoryStore;
use tower::ServiceExt;

const PASSWORD: &str = "hunter22";

struct TestApp {
    router: Router,
    mailer: Arc<MemoryMailer>,
    author_id: i64,
}

async fn app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let mailer = Arc::new(MemoryMailer::new());
    let auth = Arc::new(AuthService::new(store.clone(), Arc::new(Argon2Hasher::new())));

    let editor = auth
        .register(Registration {
            username: "editor".into(),
            email: "editor@example.com".into(),
            password: PASSWORD.into(),
            permissions: vec![Permission::AddNews, Permission::ChangeNews, Permission::DeleteNews],
        })
        .await
        .unwrap();
    auth.register(Registration {
        username: "reader".into(),
        email: "reader@example.com".into(),
        password: PASSWORD.into(),
        permissions: vec![],
    })
    .await
    .unwrap();
    let author = store.create_author(editor.id).await.unwrap();

    let notifier = ArticleNotifier::new(store.clone(), store.clone(), mailer.clone(), "noreply@example.com");
    let state = AppState {
        catalog: Arc::new(CatalogService::new(store.clone(), store.clone())),
        news: Arc::new(NewsService::new(store.clone(), store.clone())),
        articles: Arc::new(
            ArticleService::new(store.clone(), store.clone(), store.clone()).with_notifier(notifier),
        ),
        authors: Arc::new(AuthorService::new(store.clone())),
        auth,
        censor: Arc::new(Censor::new(["darn"])),
        metrics: Arc::new(Metrics::new()),
    };

    TestApp {
        router: create_router(state),
        mailer,
        author_id: author.id,
    }
}

fn basic(username: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{PASSWORD}")))
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, user: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, basic(user));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn category(app: &TestApp, name: &str) -> i64 {
    let (status, body) = send(app, post("/categories/create/", None, json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

fn product(name: &str, price: f64, category_id: i64) -> Value {
    json!({
        "name": name,
        "description": format!("{name} described at some length"),
        "quantity": 4,
        "price": price,
        "category_id": category_id,
    })
}

#[tokio::test]
async fn health_and_request_id() {
    let app = app().await;
    let response = app.router.clone().oneshot(get("/health/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn product_filters_are_strict() {
    let app = app().await;
    let tools = category(&app, "Tools").await;
    for (name, price) in [("Hammer", 10.0), ("Saw", 20.0), ("Drill", 30.0)] {
        let (status, _) = send(&app, post("/products/create/", None, product(name, price, tools))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, get("/products/?price__gt=10&price__lt=30")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["name"], "Saw");

    let (status, body) = send(&app, get("/products/?price__lt=cheap")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("price__lt"));
}

#[tokio::test]
async fn product_validation_and_conflicts() {
    let app = app().await;
    let tools = category(&app, "Tools").await;

    let same = json!({
        "name": "A long enough product name",
        "description": "A long enough product name",
        "quantity": 1,
        "price": 1.0,
        "category_id": tools,
    });
    let (status, _) = send(&app, post("/products/create/", None, same)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    send(&app, post("/products/create/", None, product("Hammer", 10.0, tools))).await;
    let (status, _) = send(&app, post("/products/create/", None, product("Hammer", 12.0, tools))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, post("/categories/create/", None, json!({ "name": "Tools" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, get("/products/999/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn category_delete_removes_its_products() {
    let app = app().await;
    let tools = category(&app, "Tools").await;
    let (_, created) = send(&app, post("/products/create/", None, product("Hammer", 10.0, tools))).await;

    let (status, _) = send(&app, post(&format!("/categories/{tools}/delete/"), None, json!({}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get(&format!("/products/{}/", created["id"]))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn news_mutations_need_credentials_and_permission() {
    let app = app().await;
    let draft = json!({
        "name": "Launch",
        "text": "We launched the darn thing.",
        "author_id": app.author_id,
    });

    let response = app
        .router
        .clone()
        .oneshot(post("/news/create/", None, draft.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

    let (status, _) = send(&app, post("/news/create/", Some("reader"), draft.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = send(&app, post("/news/create/", Some("editor"), draft)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["text"], "We launched the **** thing.");

    let (_, shown) = send(&app, get(&format!("/news/{}/", created["id"]))).await;
    assert_eq!(shown["text"], "We launched the **** thing.");
}

#[tokio::test]
async fn daily_news_limit_is_enforced() {
    let app = app().await;
    for n in 0..3 {
        let draft = json!({ "name": format!("Item {n}"), "text": "Body text", "author_id": app.author_id });
        let (status, _) = send(&app, post("/news/create/", Some("editor"), draft)).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let draft = json!({ "name": "Item 3", "text": "Body text", "author_id": app.author_id });
    let (status, _) = send(&app, post("/news/create/", Some("editor"), draft)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn news_search_by_author_and_name() {
    let app = app().await;
    for name in ["Rust release", "Garden party"] {
        let draft = json!({ "name": name, "text": "Body text", "author_id": app.author_id });
        send(&app, post("/news/create/", Some("editor"), draft)).await;
    }

    let (status, body) = send(&app, get("/news/search/?author__icontains=EDIT&name__icontains=rust")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["name"], "Rust release");

    let (status, _) = send(&app, get("/news/search/?date_published__gt=yesterday")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn articles_notify_subscribers_and_collect_votes() {
    let app = app().await;
    let tech = category(&app, "Tech").await;

    let (status, body) = send(&app, post(&format!("/categories/{tech}/subscribe/"), Some("reader"), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subscribed"], true);

    let text = "x".repeat(130);
    let (status, article) = send(
        &app,
        post(
            "/articles/create/",
            Some("editor"),
            json!({ "author_id": app.author_id, "title": "Deep dive", "text": text, "category_ids": [tech] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = article["id"].as_i64().unwrap();

    let sent = app.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["reader@example.com".to_string()]);
    assert_eq!(sent[0].subject, "New article in Tech");

    let (_, list) = send(&app, get("/articles/")).await;
    let preview = list["items"][0]["preview"].as_str().unwrap();
    assert_eq!(preview.len(), 127);
    assert!(preview.ends_with("..."));

    let (status, _) = send(&app, post(&format!("/articles/{id}/like/"), None, json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    send(&app, post(&format!("/articles/{id}/like/"), Some("reader"), json!({}))).await;
    let (_, body) = send(&app, post(&format!("/articles/{id}/like/"), Some("reader"), json!({}))).await;
    assert_eq!(body["rating"], 2);

    let (status, comment) = send(
        &app,
        post(&format!("/articles/{id}/comments/"), Some("reader"), json!({ "text": "Nice" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, body) = send(
        &app,
        post(&format!("/comments/{}/dislike/", comment["id"]), Some("editor"), json!({})),
    )
    .await;
    assert_eq!(body["rating"], -1);

    let (_, author) = send(&app, post(&format!("/authors/{}/rating/", app.author_id), None, json!({}))).await;
    // 2 * 3 for the article, -1 for the comment under it
    assert_eq!(author["rating"], 5);

    let response = app.router.clone().oneshot(get("/metrics")).await.unwrap();
    let text = String::from_utf8(to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();
    assert!(text.contains(r#"portal_votes_total{target="article",direction="like"} 2"#));
}

#[tokio::test]
async fn malformed_json_is_a_client_error() {
    let app = app().await;
    let request = Request::post("/categories/create/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn write_responses_are_censored_like_reads() {
    let app = app().await;
    let tech = category(&app, "Tech").await;

    let (status, article) = send(
        &app,
        post(
            "/articles/create/",
            Some("editor"),
            json!({ "author_id": app.author_id, "title": "A darn title", "text": "Body with darn words", "category_ids": [tech] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(article["title"], "A **** title");
    assert_eq!(article["text"], "Body with **** words");

    let id = article["id"].as_i64().unwrap();
    let (_, comment) = send(
        &app,
        post(&format!("/articles/{id}/comments/"), Some("reader"), json!({ "text": "darn good" })),
    )
    .await;
    assert_eq!(comment["text"], "**** good");

    let (_, comments) = send(&app, get(&format!("/articles/{id}/comments/"))).await;
    assert_eq!(comments[0]["text"], "**** good");
}

#[tokio::test]
async fn category_names_with_line_breaks_are_rejected() {
    let app = app().await;
    let (status, body) = send(
        &app,
        post("/categories/create/", None, json!({ "name": "Tech\r\nBcc: x@evil.test" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("line break"));
}
