//! NewsAPI integration.
//!
//! Fetches recent articles for a symbol or company name via the
//! `/v2/everything` endpoint.
//!
//! API: `https://newsapi.org/v2/everything`
//! Auth: API key via `apiKey` query param. Free tier: 100 req/day.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::NewsLookup;
use crate::types::NewsItem;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const BASE_URL: &str = "https://newsapi.org/v2";
const SOURCE_NAME: &str = "newsapi";

/// Articles requested per query. The screener truncates further.
const PAGE_SIZE: u32 = 10;

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// NewsAPI client.
pub struct NewsApiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl NewsApiClient {
    pub fn new(api_key: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .user_agent("PENNYSCOUT/0.1.0")
            .build()
            .context("Failed to build HTTP client for NewsAPI")?;

        Ok(Self {
            http,
            api_key,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Override the base URL (for tests against a local stub server).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Map raw articles to `NewsItem`s, dropping entries without a title.
    fn to_items(articles: Vec<NewsApiArticle>) -> Vec<NewsItem> {
        articles
            .into_iter()
            .filter_map(|a| {
                let title = a.title?;
                if title.is_empty() {
                    return None;
                }
                Some(NewsItem {
                    title,
                    snippet: a.description.unwrap_or_default(),
                    link: a.url.unwrap_or_default(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl NewsLookup for NewsApiClient {
    async fn fetch_news(&self, query: &str) -> Result<Vec<NewsItem>> {
        let url = format!(
            "{}/everything?q={}&sortBy=publishedAt&pageSize={}&language=en&apiKey={}",
            self.base_url,
            urlencoding::encode(query),
            PAGE_SIZE,
            self.api_key,
        );

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("News request failed for {query}"))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("News fetch for {query} returned HTTP {status}");
        }

        let body: NewsApiResponse = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse news payload for {query}"))?;

        if body.status != "ok" {
            anyhow::bail!("NewsAPI reported status {} for {query}", body.status);
        }

        let items = Self::to_items(body.articles);
        debug!(query, count = items.len(), "News fetched");
        Ok(items)
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
