//! News lookup integrations.
//!
//! Defines the `NewsLookup` trait used by the screener to decide whether a
//! price-eligible symbol is news-bearing, plus the NewsAPI implementation.
//! News calls can be slow (seconds), so the screener runs them on its
//! bounded worker pool.

pub mod newsapi;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::NewsItem;

/// Abstraction over recent-news sources.
///
/// Returns zero or more items for a symbol or company name; an empty list
/// is a normal outcome (symbol has no recent coverage), not an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsLookup: Send + Sync {
    /// Fetch recent news for a symbol or company name.
    async fn fetch_news(&self, query: &str) -> Result<Vec<NewsItem>>;

    /// Source name for logging and identification.
    fn name(&self) -> &str;
}
