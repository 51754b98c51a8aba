//! newsdesk: a personalized news aggregation backend.
//!
//! Users register, pick topics/sources/keywords and a subscription tier,
//! and get a per-user article cache refreshed from a news-search API.
//! Article text can be condensed into bullet points through an LLM API.

pub mod auth;
pub mod config;
pub mod http;
pub mod news;
pub mod settings;
pub mod storage;
pub mod summarizer;
pub mod util;
