//! Settings reconciliation: the one flow with branching logic.
//!
//! A settings update rewrites the user's preference rows (full
//! delete-and-reinsert, no diffing) and, when topics, sources, and
//! keywords all arrive in the same request, replaces the user's article
//! set with fresh search results. The whole update runs in a single
//! transaction; any failure rolls back every category together.

use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;

use crate::news::{NewsClient, NewsError, SearchArticle};
use crate::storage::{
    self, Database, NewArticle, PreferenceKind, Tier, UserSubscription,
};
use crate::util::{build_keyword_query, extract_keywords};

/// The fixed topic vocabulary the search API understands. Incoming topics
/// are lowercased and silently dropped unless they appear here.
pub const ALLOWED_TOPICS: &[&str] = &[
    "news", "sport", "tech", "world", "finance", "politics", "business", "economics",
    "entertainment", "beauty", "travel", "music", "food", "science", "gaming", "energy",
];

/// A tier change renews the subscription window for this many days.
const SUBSCRIPTION_RENEWAL_DAYS: i64 = 30;

/// Keywords extracted from each article's excerpt.
const MAX_ARTICLE_KEYWORDS: usize = 10;

const SEARCH_PAGE: u32 = 1;
const SEARCH_PAGE_SIZE: u32 = 100;

/// Incoming settings payload. Every field is optional; empty lists are
/// treated the same as absent fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub subscription: Option<String>,
    pub topic: Option<Vec<String>>,
    pub source: Option<Vec<String>>,
    pub keyword: Option<Vec<String>>,
}

/// A user's persisted settings, as returned by `GET /user/setting`.
#[derive(Debug)]
pub struct UserSettings {
    pub subscription: Option<UserSubscription>,
    pub topics: Vec<String>,
    pub sources: Vec<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    /// The news service could not be reached or failed at the transport
    /// level. Distinct from a non-"ok" search status, which only skips the
    /// affected topic.
    #[error("News service unavailable: {0}")]
    Upstream(#[from] NewsError),

    /// The news service answered with a payload we cannot persist.
    #[error("News service returned invalid article data: {0}")]
    UpstreamData(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Apply a settings update for an authenticated user.
///
/// Contract, in order:
/// 1. A valid `subscription` tier different from the current one replaces
///    the subscription row with a renewed 30-day window. Unknown tier
///    names are ignored.
/// 2. `topic`: replace all topic rows with the incoming values that
///    survive lowercasing and the [`ALLOWED_TOPICS`] filter.
/// 3. `source`: replace all source rows, unvalidated.
/// 4. `keyword`: replace all keyword rows, lowercased.
/// 5. Only when all three list categories are present and at least one
///    topic survived filtering: delete the user's articles and re-fetch,
///    one search per topic. The keyword query is built once and reused
///    verbatim for every topic. A topic whose search reports a non-"ok"
///    status contributes nothing and raises no error.
pub async fn apply_settings(
    db: &Database,
    news: &NewsClient,
    user_id: i64,
    update: &SettingsUpdate,
) -> Result<(), SettingsError> {
    let mut tx = db.begin().await?;

    if let Some(name) = update.subscription.as_deref() {
        match Tier::parse(name) {
            Some(tier) => {
                if let Some(current) = storage::get_subscription_tx(&mut tx, user_id).await? {
                    if current.tier() != Some(tier) {
                        let now = chrono::Utc::now().timestamp();
                        let end = now + SUBSCRIPTION_RENEWAL_DAYS * 86_400;
                        storage::update_subscription_tx(&mut tx, user_id, tier, now, end).await?;
                        tracing::info!(user_id, tier = tier.as_str(), "Subscription tier changed");
                    }
                }
            }
            None => {
                tracing::debug!(user_id, tier = %name, "Ignoring unknown subscription tier");
            }
        }
    }

    let filtered_topics: Option<Vec<String>> = normalized(&update.topic).map(|incoming| {
        incoming
            .iter()
            .map(|t| t.to_lowercase())
            .filter(|t| ALLOWED_TOPICS.contains(&t.as_str()))
            .collect()
    });
    if let Some(topics) = &filtered_topics {
        storage::replace_names_tx(&mut tx, PreferenceKind::Topic, user_id, topics).await?;
    }

    let sources: Option<Vec<String>> = normalized(&update.source).map(<[String]>::to_vec);
    if let Some(sources) = &sources {
        storage::replace_names_tx(&mut tx, PreferenceKind::Source, user_id, sources).await?;
    }

    let keywords: Option<Vec<String>> = normalized(&update.keyword)
        .map(|incoming| incoming.iter().map(|k| k.to_lowercase()).collect());
    if let Some(keywords) = &keywords {
        storage::replace_names_tx(&mut tx, PreferenceKind::Keyword, user_id, keywords).await?;
    }

    // The article set is replaced only when one request updates all three
    // categories and at least one topic survived filtering. Partial
    // updates leave existing articles untouched, stale or not.
    if let (Some(topics), Some(sources), Some(keywords)) = (&filtered_topics, &sources, &keywords) {
        if !topics.is_empty() {
            storage::delete_articles_for_user_tx(&mut tx, user_id).await?;

            // Built once; every topic queries with the same keyword set.
            let query = build_keyword_query(keywords);

            for topic in topics {
                let response = news
                    .search(&query, topic, sources, SEARCH_PAGE, SEARCH_PAGE_SIZE)
                    .await?;

                if response.status != "ok" {
                    tracing::warn!(
                        user_id,
                        topic = %topic,
                        status = %response.status,
                        "Search reported non-ok status, skipping topic"
                    );
                    continue;
                }

                let mut articles = Vec::with_capacity(response.articles.len());
                for raw in &response.articles {
                    articles.push(to_new_article(raw)?);
                }
                storage::insert_articles_tx(&mut tx, user_id, &articles).await?;
                tracing::info!(
                    user_id,
                    topic = %topic,
                    count = articles.len(),
                    "Persisted fetched articles"
                );
            }
        }
    }

    tx.commit().await?;
    Ok(())
}

/// Read back a user's persisted settings.
pub async fn get_settings(db: &Database, user_id: i64) -> anyhow::Result<UserSettings> {
    Ok(UserSettings {
        subscription: db.get_subscription(user_id).await?,
        topics: db.get_topics(user_id).await?,
        sources: db.get_sources(user_id).await?,
        keywords: db.get_keywords(user_id).await?,
    })
}

/// Empty lists are treated as absent: they neither clear the stored set
/// nor count toward the all-three-present refresh condition.
fn normalized(list: &Option<Vec<String>>) -> Option<&[String]> {
    match list {
        Some(values) if !values.is_empty() => Some(values),
        _ => None,
    }
}

/// Map a fetched search record onto a persistable article. The keyword
/// list is recomputed from the article's excerpt, never from user input.
fn to_new_article(raw: &SearchArticle) -> Result<NewArticle, SettingsError> {
    let published = raw.published_date.as_deref().unwrap_or_default();
    let date = NaiveDateTime::parse_from_str(published, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| {
            SettingsError::UpstreamData(format!("bad published_date {:?}: {}", published, e))
        })?
        .and_utc()
        .timestamp();

    Ok(NewArticle {
        title: raw.title.clone(),
        source: raw.clean_url.clone(),
        author: raw.authors.join(", "),
        date,
        summary: raw.summary.clone(),
        link: raw.link.clone(),
        image_url: raw.media.clone(),
        keywords: extract_keywords(raw.excerpt.as_deref().unwrap_or_default(), MAX_ARTICLE_KEYWORDS),
    })
}
