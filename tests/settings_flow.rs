//! Integration tests for the settings-reconciliation flow: preference
//! replacement, tier changes, and the conditional article refresh.
//!
//! Each test creates its own in-memory SQLite database and a wiremock
//! stand-in for the news-search API, then drives the flow through the
//! public `settings` module the way the HTTP layer does.

use newsdesk::news::NewsClient;
use newsdesk::settings::{apply_settings, get_settings, SettingsUpdate};
use newsdesk::storage::{Database, Role, Tier};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn test_db() -> (Database, i64) {
    let db = Database::open(":memory:").await.unwrap();
    let user_id = db
        .create_user("Ada", "Lovelace", "ada@example.com", "hash", Role::User)
        .await
        .unwrap();
    let now = chrono::Utc::now().timestamp();
    db.create_subscription(user_id, Tier::Free, now, now + 365 * 86_400)
        .await
        .unwrap();
    (db, user_id)
}

fn ok_articles(titles: &[&str]) -> serde_json::Value {
    let articles: Vec<serde_json::Value> = titles
        .iter()
        .map(|title| {
            serde_json::json!({
                "title": title,
                "clean_url": "example.com",
                "authors": ["Jane Doe"],
                "published_date": "2023-11-14 12:00:00",
                "summary": "A summary",
                "excerpt": "Technology adoption keeps accelerating across industries",
                "link": "https://example.com/a",
                "media": "https://example.com/a.jpg"
            })
        })
        .collect();
    serde_json::json!({"status": "ok", "total_hits": titles.len(), "articles": articles})
}

fn full_update(topics: &[&str], sources: &[&str], keywords: &[&str]) -> SettingsUpdate {
    let vecify = |xs: &[&str]| -> Option<Vec<String>> {
        if xs.is_empty() {
            None
        } else {
            Some(xs.iter().map(|s| s.to_string()).collect())
        }
    };
    SettingsUpdate {
        subscription: None,
        topic: vecify(topics),
        source: vecify(sources),
        keyword: vecify(keywords),
    }
}

// ============================================================================
// Subscription Tier
// ============================================================================

#[tokio::test]
async fn test_tier_change_renews_thirty_day_window() {
    let (db, user_id) = test_db().await;
    let news = NewsClient::new(None, Some("http://127.0.0.1:1".to_string())).unwrap();

    let before = chrono::Utc::now().timestamp();
    let update = SettingsUpdate {
        subscription: Some("PAID".to_string()),
        ..SettingsUpdate::default()
    };
    apply_settings(&db, &news, user_id, &update).await.unwrap();
    let after = chrono::Utc::now().timestamp();

    let sub = db.get_subscription(user_id).await.unwrap().unwrap();
    assert_eq!(sub.tier(), Some(Tier::Paid));
    assert_eq!(sub.end_date, sub.start_date + 30 * 86_400);
    assert!(sub.start_date >= before && sub.start_date <= after);
}

#[tokio::test]
async fn test_same_tier_does_not_touch_window() {
    let (db, user_id) = test_db().await;
    let news = NewsClient::new(None, Some("http://127.0.0.1:1".to_string())).unwrap();

    let original = db.get_subscription(user_id).await.unwrap().unwrap();
    let update = SettingsUpdate {
        subscription: Some("free".to_string()),
        ..SettingsUpdate::default()
    };
    apply_settings(&db, &news, user_id, &update).await.unwrap();

    let sub = db.get_subscription(user_id).await.unwrap().unwrap();
    assert_eq!(sub.start_date, original.start_date);
    assert_eq!(sub.end_date, original.end_date);
}

// ============================================================================
// Topic Filtering
// ============================================================================

#[tokio::test]
async fn test_only_allowed_topics_survive() {
    let (db, user_id) = test_db().await;
    let news = NewsClient::new(None, Some("http://127.0.0.1:1".to_string())).unwrap();

    // Topic-only update: no refresh, so the dead client is never called.
    let update = full_update(&["Tech", "SPORT", "astrology", "finance"], &[], &[]);
    apply_settings(&db, &news, user_id, &update).await.unwrap();

    let topics: BTreeSet<String> = db.get_topics(user_id).await.unwrap().into_iter().collect();
    let expected: BTreeSet<String> = ["tech", "sport", "finance"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(topics, expected);
}

// ============================================================================
// Article Refresh Gating
// ============================================================================

#[tokio::test]
async fn test_partial_updates_never_touch_articles() {
    let (db, user_id) = test_db().await;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_articles(&["Seed Article"])))
        .mount(&server)
        .await;
    let news = NewsClient::new(None, Some(server.uri())).unwrap();

    apply_settings(&db, &news, user_id, &full_update(&["tech"], &["a.com"], &["ai"]))
        .await
        .unwrap();
    assert_eq!(db.list_articles(user_id, 1, 10).await.unwrap().total, 1);

    // Each two-of-three combination must leave articles alone.
    let partials = [
        full_update(&["science"], &["b.com"], &[]),
        full_update(&["science"], &[], &["fusion"]),
        full_update(&[], &["b.com"], &["fusion"]),
    ];
    for partial in &partials {
        apply_settings(&db, &news, user_id, partial).await.unwrap();
        let page = db.list_articles(user_id, 1, 10).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.articles[0].title, "Seed Article");
    }
}

#[tokio::test]
async fn test_full_update_persists_every_article_with_derived_slug() {
    let (db, user_id) = test_db().await;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_articles(&[
            "Rust Hits The Headlines",
            "AI Moves Fast",
            "Quiet Week In Tech",
        ])))
        .mount(&server)
        .await;
    let news = NewsClient::new(None, Some(server.uri())).unwrap();

    apply_settings(&db, &news, user_id, &full_update(&["tech"], &["a.com"], &["ai"]))
        .await
        .unwrap();

    let page = db.list_articles(user_id, 1, 10).await.unwrap();
    assert_eq!(page.total, 3);
    for article in &page.articles {
        assert_eq!(
            article.slug,
            article.title.to_lowercase().replace(' ', "-")
        );
    }
}

#[tokio::test]
async fn test_non_ok_topic_skipped_without_error() {
    let (db, user_id) = test_db().await;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/search"))
        .and(query_param("topic", "tech"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_articles(&["Tech Story"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/search"))
        .and(query_param("topic", "science"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "No matches for your search.",
            "articles": []
        })))
        .mount(&server)
        .await;
    let news = NewsClient::new(None, Some(server.uri())).unwrap();

    apply_settings(
        &db,
        &news,
        user_id,
        &full_update(&["tech", "science"], &["a.com"], &["ai"]),
    )
    .await
    .unwrap();

    // The non-ok topic contributed nothing; the ok topic persisted.
    let page = db.list_articles(user_id, 1, 10).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.articles[0].title, "Tech Story");
}

#[tokio::test]
async fn test_refresh_replaces_previous_article_set() {
    let (db, user_id) = test_db().await;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/search"))
        .and(query_param("q", "ai"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_articles(&["Old One", "Old Two"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/search"))
        .and(query_param("q", "fusion"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_articles(&["New One"])))
        .mount(&server)
        .await;
    let news = NewsClient::new(None, Some(server.uri())).unwrap();

    apply_settings(&db, &news, user_id, &full_update(&["tech"], &["a.com"], &["ai"]))
        .await
        .unwrap();
    assert_eq!(db.list_articles(user_id, 1, 10).await.unwrap().total, 2);

    apply_settings(
        &db,
        &news,
        user_id,
        &full_update(&["tech"], &["a.com"], &["fusion"]),
    )
    .await
    .unwrap();

    let page = db.list_articles(user_id, 1, 10).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.articles[0].title, "New One");
}

// ============================================================================
// Round-trip
// ============================================================================

#[tokio::test]
async fn test_settings_roundtrip_order_insensitive() {
    let (db, user_id) = test_db().await;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_articles(&[])))
        .mount(&server)
        .await;
    let news = NewsClient::new(None, Some(server.uri())).unwrap();

    apply_settings(
        &db,
        &news,
        user_id,
        &full_update(
            &["tech", "finance", "science"],
            &["a.com", "b.com"],
            &["AI", "Machine Learning"],
        ),
    )
    .await
    .unwrap();

    let settings = get_settings(&db, user_id).await.unwrap();

    let as_set = |names: &[&str]| -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    };

    let topics: BTreeSet<String> = settings.topics.into_iter().collect();
    let sources: BTreeSet<String> = settings.sources.into_iter().collect();
    let keywords: BTreeSet<String> = settings.keywords.into_iter().collect();

    assert_eq!(topics, as_set(&["tech", "finance", "science"]));
    assert_eq!(sources, as_set(&["a.com", "b.com"]));
    // Keywords come back lowercased: that is what was persisted.
    assert_eq!(keywords, as_set(&["ai", "machine learning"]));
    assert!(settings.subscription.is_some());
}

// ============================================================================
// Full walkthrough
// ============================================================================

#[tokio::test]
async fn test_scenario_single_surviving_topic_one_search_call() {
    let (db, user_id) = test_db().await;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/search"))
        .and(query_param("topic", "tech"))
        .and(query_param("q", "ai"))
        .and(query_param("sources", "a.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_articles(&["Only Hit"])))
        .expect(1)
        .mount(&server)
        .await;
    let news = NewsClient::new(None, Some(server.uri())).unwrap();

    apply_settings(
        &db,
        &news,
        user_id,
        &full_update(&["tech", "bogus"], &["a.com"], &["AI"]),
    )
    .await
    .unwrap();

    assert_eq!(db.get_topics(user_id).await.unwrap(), vec!["tech"]);
    let page = db.list_articles(user_id, 1, 10).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.articles[0].slug, "only-hit");
}
