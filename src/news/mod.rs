mod client;

pub use client::{NewsClient, NewsError, SearchArticle, SearchResponse};
