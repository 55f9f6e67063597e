//! Shared types for the PENNYSCOUT agent.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that market, stream, and engine
//! modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Exchange ticker string. The unique key across all components.
pub type Symbol = String;

/// News items kept per candidate, in source order.
pub const MAX_NEWS_ITEMS: usize = 5;

// ---------------------------------------------------------------------------
// Quote
// ---------------------------------------------------------------------------

/// A point-in-time quote for a security, re-fetched per screening pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    /// Last traded price.
    pub price: f64,
    /// Daily high.
    pub high: f64,
    /// Daily low.
    pub low: f64,
    /// Daily cumulative volume.
    pub volume: f64,
    /// When this quote was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ${:.2} (H ${:.2} / L ${:.2} | vol {:.0})",
            self.symbol, self.price, self.high, self.low, self.volume,
        )
    }
}

impl Quote {
    /// Daily trading range — the ranking tie-break (volatility proxy).
    pub fn daily_range(&self) -> f64 {
        self.high - self.low
    }
}

// ---------------------------------------------------------------------------
// News
// ---------------------------------------------------------------------------

/// A single news article reference. Immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub snippet: String,
    pub link: String,
}

impl fmt::Display for NewsItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.title, self.link)
    }
}

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// A screened security eligible for ranking.
///
/// Invariant maintained by the screener: `quote.price` is below the
/// configured threshold and `news` is non-empty (truncated to
/// [`MAX_NEWS_ITEMS`] in source order).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub symbol: Symbol,
    /// Company name as listed in the catalog.
    pub name: String,
    pub quote: Quote,
    pub news: Vec<NewsItem>,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) ${:.2} | {} news",
            self.symbol,
            self.name,
            self.quote.price,
            self.news.len(),
        )
    }
}

impl Candidate {
    /// Helper to build a test candidate with sensible defaults.
    #[cfg(test)]
    pub fn sample(symbol: &str, price: f64, volume: f64) -> Self {
        Candidate {
            symbol: symbol.to_string(),
            name: format!("{symbol} Corp"),
            quote: Quote {
                symbol: symbol.to_string(),
                price,
                high: price * 1.1,
                low: price * 0.9,
                volume,
                fetched_at: Utc::now(),
            },
            news: vec![NewsItem {
                title: format!("{symbol} announces results"),
                snippet: "Quarterly results announced.".to_string(),
                link: format!("https://example.com/{symbol}"),
            }],
        }
    }
}

// ---------------------------------------------------------------------------
// Trade ticks & aggregates
// ---------------------------------------------------------------------------

/// A single reported trade event. Ephemeral — never persisted individually.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeTick {
    pub symbol: Symbol,
    pub price: f64,
    pub volume: f64,
    pub timestamp: DateTime<Utc>,
}

/// Running summary statistics for one subscribed symbol's tick stream.
///
/// Built from commutative, associative operations (count, sums) only, so
/// out-of-order or dropped delivery affects completeness, never
/// correctness. Mutated exclusively by the aggregator's ingestion path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolAggregate {
    pub symbol: Symbol,
    pub tick_count: u64,
    pub sum_price: f64,
    pub sum_volume: f64,
}

impl SymbolAggregate {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            tick_count: 0,
            sum_price: 0.0,
            sum_volume: 0.0,
        }
    }

    /// Fold one tick into the aggregate. O(1).
    pub fn apply(&mut self, tick: &TradeTick) {
        self.tick_count += 1;
        self.sum_price += tick.price;
        self.sum_volume += tick.volume;
    }

    /// Average observed trade price. None until the first tick arrives.
    pub fn avg_price(&self) -> Option<f64> {
        if self.tick_count == 0 {
            None
        } else {
            Some(self.sum_price / self.tick_count as f64)
        }
    }

    /// Total streamed volume over the aggregation window.
    pub fn total_volume(&self) -> f64 {
        self.sum_volume
    }
}

impl fmt::Display for SymbolAggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ticks | avg ${:.3} | vol {:.0}",
            self.symbol,
            self.tick_count,
            self.avg_price().unwrap_or(0.0),
            self.sum_volume,
        )
    }
}

// ---------------------------------------------------------------------------
// Ranking output
// ---------------------------------------------------------------------------

/// Read-only projection of a [`SymbolAggregate`] attached to a ranked entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveStats {
    pub avg_price: f64,
    pub total_volume: f64,
    pub tick_count: u64,
}

/// One row of the ranked top-N list. Derived, recomputed per ranking pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedEntry {
    pub candidate: Candidate,
    /// Present only when a live aggregate with at least one tick existed
    /// at snapshot time.
    pub live: Option<LiveStats>,
    /// Effective volume used as the primary sort key.
    pub rank_score: f64,
}

impl fmt::Display for RankedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.live {
            Some(live) => write!(
                f,
                "{} score={:.0} (live: {} ticks, avg ${:.3})",
                self.candidate.symbol, self.rank_score, live.tick_count, live.avg_price,
            ),
            None => write!(
                f,
                "{} score={:.0} (static quote volume)",
                self.candidate.symbol, self.rank_score,
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Sentiment
// ---------------------------------------------------------------------------

/// Ordered polarity scores for one candidate's news titles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub symbol: Symbol,
    /// One polarity in [-1, 1] per scored news item, in news order.
    pub scores: Vec<f64>,
}

impl SentimentSummary {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            scores: Vec::new(),
        }
    }

    /// Mean polarity across scored items. 0.0 when no items were scored.
    pub fn mean(&self) -> f64 {
        if self.scores.is_empty() {
            0.0
        } else {
            self.scores.iter().sum::<f64>() / self.scores.len() as f64
        }
    }
}

impl fmt::Display for SentimentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: mean {:+.2} over {} items",
            self.symbol,
            self.mean(),
            self.scores.len(),
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error taxonomy for PENNYSCOUT.
///
/// Only `CatalogUnavailable` is fatal to a screening pass; everything else
/// is local to one unit of work and absorbed by the component that hit it.
#[derive(Debug, thiserror::Error)]
pub enum PennyScoutError {
    #[error("Market catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Fetch failed for symbol {symbol}: {message}")]
    SymbolFetchFailed { symbol: Symbol, message: String },

    #[error("Trade feed disconnected: {0}")]
    FeedDisconnected(String),

    #[error("Sentiment scoring failed: {0}")]
    ScoringFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
