//! Client for the news-search API (NewsCatcher-style `/v2` endpoints).
//!
//! The caller treats any response whose `status` is not `"ok"` as "no
//! articles for this topic"; transport-level failures (timeout, network,
//! HTTP error status) surface as `NewsError` and are the caller's signal
//! that the upstream service is unavailable.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.newscatcherapi.com";

/// Every request is bounded by this timeout; there is no retry policy.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("Request timed out after 20s")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Invalid base URL")]
    InvalidBaseUrl,
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
}

/// One article record from the search API.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchArticle {
    #[serde(default)]
    pub title: String,
    /// Clean source domain, e.g. `nytimes.com`.
    #[serde(default)]
    pub clean_url: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub authors: Vec<String>,
    /// `%Y-%m-%d %H:%M:%S`, as the API formats it.
    pub published_date: Option<String>,
    pub summary: Option<String>,
    pub excerpt: Option<String>,
    pub link: Option<String>,
    pub media: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub status: String,
    #[serde(default)]
    pub total_hits: i64,
    #[serde(default)]
    pub articles: Vec<SearchArticle>,
}

#[derive(Debug, Deserialize)]
struct SourcesResponse {
    #[serde(default)]
    sources: Vec<String>,
}

/// The API emits `authors` either as a list or as one comma-separated
/// string depending on the article; accept both.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(list)) => list,
        Some(OneOrMany::One(s)) => s
            .split(',')
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect(),
    })
}

#[derive(Clone)]
pub struct NewsClient {
    http: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
}

impl NewsClient {
    /// Build a client. A custom `base_url` must be HTTPS unless it points
    /// at localhost (wiremock test servers).
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Result<Self, NewsError> {
        let base = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let parsed = url::Url::parse(&base).map_err(|_| NewsError::InvalidBaseUrl)?;
        match parsed.scheme() {
            "https" => {}
            "http" => {
                let host = parsed.host_str().unwrap_or_default();
                if host != "127.0.0.1" && host != "localhost" {
                    tracing::error!(base_url = %base, "Rejecting non-HTTPS news base URL");
                    return Err(NewsError::InsecureBaseUrl);
                }
                tracing::warn!(base_url = %base, "Using non-HTTPS news base URL (localhost only)");
            }
            _ => return Err(NewsError::InsecureBaseUrl),
        }

        Ok(Self {
            http: reqwest::Client::new(),
            api_key: api_key.map(SecretString::from),
            base_url: base.trim_end_matches('/').to_string(),
        })
    }

    /// Search for articles matching a keyword query within one topic,
    /// restricted to the given sources.
    pub async fn search(
        &self,
        query: &str,
        topic: &str,
        sources: &[String],
        page: u32,
        page_size: u32,
    ) -> Result<SearchResponse, NewsError> {
        let url = format!("{}/v2/search", self.base_url);
        let sources_param = sources.join(",");
        let page_param = page.to_string();
        let page_size_param = page_size.to_string();
        let request = self.http.get(&url).query(&[
            ("q", query),
            ("topic", topic),
            ("sources", sources_param.as_str()),
            ("page", page_param.as_str()),
            ("page_size", page_size_param.as_str()),
            ("lang", "en"),
        ]);

        let response = self.send(request).await?;
        Ok(response.json::<SearchResponse>().await?)
    }

    /// Publisher domains the API knows for a topic (all topics when `None`).
    pub async fn sources(&self, topic: Option<&str>) -> Result<Vec<String>, NewsError> {
        let url = format!("{}/v2/sources", self.base_url);
        let mut request = self.http.get(&url).query(&[("lang", "en")]);
        if let Some(topic) = topic {
            request = request.query(&[("topic", topic)]);
        }

        let response = self.send(request).await?;
        Ok(response.json::<SourcesResponse>().await?.sources)
    }

    async fn send(&self, mut request: reqwest::RequestBuilder) -> Result<reqwest::Response, NewsError> {
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key.expose_secret());
        }

        let response = tokio::time::timeout(REQUEST_TIMEOUT, request.send())
            .await
            .map_err(|_| NewsError::Timeout)?
            .map_err(NewsError::Network)?;

        if !response.status().is_success() {
            return Err(NewsError::HttpStatus(response.status().as_u16()));
        }

        Ok(response)
    }
}
