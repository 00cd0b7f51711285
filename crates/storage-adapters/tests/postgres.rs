//! `PgStore` against a throwaway Postgres container.
//!
//! Needs a Docker daemon; run with
//! `cargo test -p storage-adapters --features db-postgres,test-postgres`.

use chrono::{Duration, TimeZone, Utc};
use domains::filters::{NewsFilter, ProductFilter};
use domains::{
    ArticleRepo, Author, CatalogRepo, Category, DomainError, NewCategory, NewComment, NewUser,
    NewsInput, NewsRepo, Page, PostInput, PostType, ProductInput, RatingTotals, SubscriptionRepo,
    User, UserRepo,
};
use storage_adapters::PgStore;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres;

struct TestDb {
    store: PgStore,
    // Dropping the handle stops the container.
    _node: ContainerAsync<Postgres>,
}

async fn database() -> TestDb {
    let node = Postgres::default().start().await.unwrap();
    let host = node.get_host().await.unwrap();
    let port = node.get_host_port_ipv4(5432).await.unwrap();
    let url = format!("postgres://postgres:postgres@{host}:{port}/postgres");

    let store = PgStore::connect(&url, 4).await.unwrap();
    store.migrate().await.unwrap();
    TestDb { store, _node: node }
}

async fn seeded(store: &PgStore) -> (Category, Author, User) {
    let category = store
        .create_category(NewCategory { name: "Kitchen".into() })
        .await
        .unwrap();
    let user = store
        .create_user(NewUser {
            username: "joanna".into(),
            email: "joanna@example.com".into(),
            password_hash: "x".into(),
            permissions: vec![],
        })
        .await
        .unwrap();
    let author = store.create_author(user.id).await.unwrap();
    (category, author, user)
}

fn product(name: &str, category_id: i64, price: f64) -> ProductInput {
    ProductInput {
        name: name.into(),
        description: format!("{name} with a long enough description"),
        quantity: 1,
        price,
        category_id,
    }
}

fn article(author_id: i64, title: &str, category_ids: Vec<i64>) -> PostInput {
    PostInput {
        author_id,
        post_type: PostType::Post,
        title: title.into(),
        text: format!("{title} text"),
        category_ids,
    }
}

#[tokio::test]
async fn duplicate_names_map_to_conflict() {
    let db = database().await;
    let (category, ..) = seeded(&db.store).await;

    db.store.create_product(product("Kettle", category.id, 10.0)).await.unwrap();
    let err = db
        .store
        .create_product(product("Kettle", category.id, 12.0))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(msg) if msg.contains("product")));

    let err = db
        .store
        .create_category(NewCategory { name: "Kitchen".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(msg) if msg.contains("category")));
}

#[tokio::test]
async fn unknown_category_is_a_validation_error() {
    let db = database().await;
    let err = db.store.create_product(product("Kettle", 999, 10.0)).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn deleting_category_cascades_to_products_links_and_subscriptions() {
    let db = database().await;
    let (kitchen, author, user) = seeded(&db.store).await;
    let garden = db
        .store
        .create_category(NewCategory { name: "Garden".into() })
        .await
        .unwrap();
    db.store.create_product(product("Kettle", kitchen.id, 10.0)).await.unwrap();
    db.store.create_product(product("Toaster", kitchen.id, 20.0)).await.unwrap();
    let rake = db.store.create_product(product("Rake", garden.id, 5.0)).await.unwrap();
    db.store.toggle_subscription(kitchen.id, user.id).await.unwrap();
    let post = db
        .store
        .create_post(article(author.id, "Spring", vec![kitchen.id, garden.id]))
        .await
        .unwrap();

    assert!(db.store.delete_category(kitchen.id).await.unwrap());

    let left = db
        .store
        .list_products(&ProductFilter::default(), Page::new(1, 10))
        .await
        .unwrap();
    assert_eq!(left.items, vec![rake]);
    assert!(db.store.all_subscribers().await.unwrap().is_empty());
    let post = db.store.get_post(post.id).await.unwrap().unwrap();
    assert_eq!(post.category_ids, vec![garden.id]);
    assert!(!db.store.delete_category(kitchen.id).await.unwrap());
}

#[tokio::test]
async fn posts_fold_their_categories() {
    let db = database().await;
    let (kitchen, author, _) = seeded(&db.store).await;
    let garden = db
        .store
        .create_category(NewCategory { name: "Garden".into() })
        .await
        .unwrap();

    let linked = db
        .store
        .create_post(article(author.id, "Spring", vec![kitchen.id, garden.id]))
        .await
        .unwrap();
    let bare = db.store.create_post(article(author.id, "Winter", vec![])).await.unwrap();

    let mut ids = db.store.get_post(linked.id).await.unwrap().unwrap().category_ids;
    ids.sort_unstable();
    assert_eq!(ids, vec![kitchen.id, garden.id]);
    assert!(db.store.get_post(bare.id).await.unwrap().unwrap().category_ids.is_empty());

    let page = db.store.list_posts(Some(PostType::Post), Page::new(1, 10)).await.unwrap();
    assert_eq!(page.total, 2);
    assert!(page.items.iter().any(|p| p.id == bare.id && p.category_ids.is_empty()));

    let updated = db
        .store
        .update_post(linked.id, article(author.id, "Spring", vec![garden.id]))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.category_ids, vec![garden.id]);
}

#[tokio::test]
async fn product_filters_are_strict_and_literal() {
    let db = database().await;
    let (category, ..) = seeded(&db.store).await;
    db.store.create_product(product("Cheap", category.id, 5.0)).await.unwrap();
    db.store.create_product(product("Exact", category.id, 10.0)).await.unwrap();
    db.store.create_product(product("Pricey", category.id, 15.0)).await.unwrap();
    db.store.create_product(product("50% off", category.id, 1.0)).await.unwrap();
    db.store.create_product(product("500 off", category.id, 1.0)).await.unwrap();

    let above = ProductFilter {
        price_gt: Some(10.0),
        ..Default::default()
    };
    let page = db.store.list_products(&above, Page::new(1, 5)).await.unwrap();
    let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Pricey"]);

    let literal = ProductFilter {
        name_icontains: Some("0% OFF".into()),
        ..Default::default()
    };
    let page = db.store.list_products(&literal, Page::new(1, 5)).await.unwrap();
    let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["50% off"]);
}

#[tokio::test]
async fn products_page_in_name_order() {
    let db = database().await;
    let (category, ..) = seeded(&db.store).await;
    for name in ["Fork", "Apron", "Kettle", "Bowl", "Grater", "Cup"] {
        db.store.create_product(product(name, category.id, 1.0)).await.unwrap();
    }

    let second = db
        .store
        .list_products(&ProductFilter::default(), Page::new(2, 5))
        .await
        .unwrap();
    assert_eq!(second.total, 6);
    let names: Vec<_> = second.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Kettle"]);
}

#[tokio::test]
async fn toggle_subscription_flips_state() {
    let db = database().await;
    let (category, _, user) = seeded(&db.store).await;

    assert!(db.store.toggle_subscription(category.id, user.id).await.unwrap());
    let subscribers = db.store.category_subscribers(category.id).await.unwrap();
    assert_eq!(subscribers.iter().map(|u| u.id).collect::<Vec<_>>(), vec![user.id]);
    assert!(!db.store.toggle_subscription(category.id, user.id).await.unwrap());
    assert!(db.store.category_subscribers(category.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn all_subscribers_lists_each_user_once() {
    let db = database().await;
    let (kitchen, _, user) = seeded(&db.store).await;
    let garden = db
        .store
        .create_category(NewCategory { name: "Garden".into() })
        .await
        .unwrap();
    db.store.toggle_subscription(kitchen.id, user.id).await.unwrap();
    db.store.toggle_subscription(garden.id, user.id).await.unwrap();

    let all = db.store.all_subscribers().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].email, "joanna@example.com");
}

#[tokio::test]
async fn published_between_is_half_open() {
    let db = database().await;
    let (_, author, _) = seeded(&db.store).await;
    let monday = Utc.with_ymd_and_hms(2024, 5, 13, 0, 0, 0).unwrap();
    for (name, at) in [
        ("before", monday - Duration::seconds(1)),
        ("start", monday),
        ("inside", monday + Duration::days(3)),
        ("end", monday + Duration::days(7)),
    ] {
        db.store
            .create_news(NewsInput {
                name: name.into(),
                text: format!("{name} text"),
                date_published: at,
                author_id: author.id,
            })
            .await
            .unwrap();
    }

    let names: Vec<String> = db
        .store
        .published_between(monday, monday + Duration::days(7))
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.name)
        .collect();
    assert_eq!(names, vec!["start", "inside"]);
    assert_eq!(
        db.store
            .count_by_author_between(author.id, monday, monday + Duration::days(7))
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn news_search_matches_author_username() {
    let db = database().await;
    let (_, author, _) = seeded(&db.store).await;
    db.store
        .create_news(NewsInput {
            name: "Launch".into(),
            text: "We launched".into(),
            date_published: Utc::now(),
            author_id: author.id,
        })
        .await
        .unwrap();

    let hit = NewsFilter {
        author_icontains: Some("JOAN".into()),
        ..Default::default()
    };
    let miss = NewsFilter {
        author_icontains: Some("bob".into()),
        ..Default::default()
    };
    let wildcard = NewsFilter {
        name_icontains: Some("_".into()),
        ..Default::default()
    };
    assert_eq!(db.store.search_news(&hit, Page::new(1, 10)).await.unwrap().total, 1);
    assert_eq!(db.store.search_news(&miss, Page::new(1, 10)).await.unwrap().total, 0);
    assert_eq!(db.store.search_news(&wildcard, Page::new(1, 10)).await.unwrap().total, 0);
}

#[tokio::test]
async fn ratings_move_one_step_per_call_and_feed_author_totals() {
    let db = database().await;
    let (category, author, user) = seeded(&db.store).await;
    let post = db
        .store
        .create_post(article(author.id, "Comets", vec![category.id]))
        .await
        .unwrap();
    let comment = db
        .store
        .create_comment(NewComment {
            post_id: post.id,
            user_id: user.id,
            text: "Nice".into(),
        })
        .await
        .unwrap();

    assert_eq!(db.store.adjust_post_rating(post.id, 1).await.unwrap(), Some(1));
    assert_eq!(db.store.adjust_post_rating(post.id, 1).await.unwrap(), Some(2));
    assert_eq!(db.store.adjust_comment_rating(comment.id, -1).await.unwrap(), Some(-1));
    assert_eq!(db.store.adjust_post_rating(999, 1).await.unwrap(), None);

    let totals = db.store.rating_totals(author.id).await.unwrap();
    assert_eq!(
        totals,
        RatingTotals {
            posts: 2,
            own_comments: -1,
            comments_on_posts: -1,
        }
    );
    let author = db
        .store
        .set_author_rating(author.id, totals.author_rating())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(author.rating, 4);
}

#[tokio::test]
async fn concurrent_votes_are_not_lost() {
    let db = database().await;
    let (_, author, _) = seeded(&db.store).await;
    let post_id = db.store.create_post(article(author.id, "Comets", vec![])).await.unwrap().id;

    let votes: Vec<_> = (0..20)
        .map(|_| {
            let store = db.store.clone();
            tokio::spawn(async move { store.adjust_post_rating(post_id, 1).await })
        })
        .collect();
    for vote in votes {
        vote.await.unwrap().unwrap();
    }

    assert_eq!(db.store.get_post(post_id).await.unwrap().unwrap().rating, 20);
}

#[tokio::test]
async fn deleting_post_removes_its_comments() {
    let db = database().await;
    let (_, author, user) = seeded(&db.store).await;
    let post = db.store.create_post(article(author.id, "Comets", vec![])).await.unwrap();
    db.store
        .create_comment(NewComment {
            post_id: post.id,
            user_id: user.id,
            text: "Nice".into(),
        })
        .await
        .unwrap();

    assert!(db.store.delete_post(post.id).await.unwrap());
    assert!(db.store.list_comments(post.id).await.unwrap().is_empty());
    assert!(!db.store.delete_post(post.id).await.unwrap());
}

#[tokio::test]
async fn author_is_one_to_one_with_user() {
    let db = database().await;
    let (_, author, user) = seeded(&db.store).await;

    let err = db.store.create_author(user.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
    assert_eq!(
        db.store.author_username(author.id).await.unwrap().as_deref(),
        Some("joanna")
    );
}
