//! End-to-end pipeline tests.
//!
//! Drives the full screen→aggregate→rank→sentiment flow against
//! deterministic in-memory market and news sources — no network,
//! no external dependencies.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;

use pennyscout::engine::ranker::RankingEngine;
use pennyscout::engine::screener::CandidateScreener;
use pennyscout::market::{MarketCatalogSource, SymbolListing};
use pennyscout::news::NewsLookup;
use pennyscout::sentiment::aggregator::SentimentAggregator;
use pennyscout::sentiment::lexicon::LexiconScorer;
use pennyscout::stream::TradeStreamAggregator;
use pennyscout::types::{NewsItem, Quote, TradeTick};

// ---------------------------------------------------------------------------
// Mock sources
// ---------------------------------------------------------------------------

/// Deterministic in-memory catalog. Listings and quotes are fully
/// controllable from test code.
struct MockCatalog {
    listings: Vec<SymbolListing>,
    quotes: HashMap<String, Quote>,
    /// If set, `list_symbols` returns this error.
    force_catalog_error: Mutex<Option<String>>,
}

impl MockCatalog {
    fn new(listings: Vec<SymbolListing>, quotes: Vec<Quote>) -> Self {
        Self {
            listings,
            quotes: quotes.into_iter().map(|q| (q.symbol.clone(), q)).collect(),
            force_catalog_error: Mutex::new(None),
        }
    }

    fn set_catalog_error(&self, msg: &str) {
        *self.force_catalog_error.lock().unwrap() = Some(msg.to_string());
    }
}

#[async_trait]
impl MarketCatalogSource for MockCatalog {
    async fn list_symbols(&self, _exchange: &str) -> Result<Vec<SymbolListing>> {
        if let Some(msg) = self.force_catalog_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{msg}"));
        }
        Ok(self.listings.clone())
    }

    async fn get_quote(&self, symbol: &str) -> Result<Option<Quote>> {
        Ok(self.quotes.get(symbol).cloned())
    }

    fn name(&self) -> &str {
        "mock-catalog"
    }
}

/// In-memory news source keyed by query substring.
struct MockNews {
    by_query: HashMap<String, Vec<NewsItem>>,
}

impl MockNews {
    fn new(by_query: Vec<(&str, Vec<NewsItem>)>) -> Self {
        Self {
            by_query: by_query
                .into_iter()
                .map(|(q, items)| (q.to_string(), items))
                .collect(),
        }
    }
}

#[async_trait]
impl NewsLookup for MockNews {
    async fn fetch_news(&self, query: &str) -> Result<Vec<NewsItem>> {
        Ok(self.by_query.get(query).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "mock-news"
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn listing(symbol: &str, name: &str) -> SymbolListing {
    SymbolListing {
        symbol: symbol.to_string(),
        name: name.to_string(),
        instrument_type: "Common Stock".to_string(),
    }
}

fn quote(symbol: &str, price: f64, volume: f64) -> Quote {
    Quote {
        symbol: symbol.to_string(),
        price,
        high: price * 1.2,
        low: price * 0.8,
        volume,
        fetched_at: Utc::now(),
    }
}

fn article(title: &str) -> NewsItem {
    NewsItem {
        title: title.to_string(),
        snippet: String::new(),
        link: "https://news.example.com/a".to_string(),
    }
}

fn tick(symbol: &str, price: f64, volume: f64) -> TradeTick {
    TradeTick {
        symbol: symbol.to_string(),
        price,
        volume,
        timestamp: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// Two listings, one under the price ceiling with news coverage:
/// exactly that one survives screening.
#[tokio::test]
async fn test_screening_keeps_cheap_covered_symbol_only() {
    let catalog = Arc::new(MockCatalog::new(
        vec![listing("AAA", "AAA Corp"), listing("BBB", "BBB Inc")],
        vec![quote("AAA", 2.0, 1000.0), quote("BBB", 50.0, 9000.0)],
    ));
    let news = Arc::new(MockNews::new(vec![(
        "AAA Corp",
        vec![article("AAA Corp lands major contract")],
    )]));

    let screener = CandidateScreener::new(catalog, news, "US".to_string(), 4);
    let candidates = screener.screen(100, 5.0).await.unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].symbol, "AAA");
    assert_eq!(candidates[0].news.len(), 1);
}

/// Cheap symbols without any news coverage are not candidates.
#[tokio::test]
async fn test_screening_drops_uncovered_symbol() {
    let catalog = Arc::new(MockCatalog::new(
        vec![listing("AAA", "AAA Corp")],
        vec![quote("AAA", 2.0, 1000.0)],
    ));
    let news = Arc::new(MockNews::new(vec![]));

    let screener = CandidateScreener::new(catalog, news, "US".to_string(), 4);
    let candidates = screener.screen(100, 5.0).await.unwrap();
    assert!(candidates.is_empty());
}

/// A dead catalog aborts the whole screening pass.
#[tokio::test]
async fn test_catalog_outage_fails_screening() {
    let catalog = Arc::new(MockCatalog::new(vec![listing("AAA", "AAA Corp")], vec![]));
    catalog.set_catalog_error("catalog down");
    let news = Arc::new(MockNews::new(vec![]));

    let screener = CandidateScreener::new(catalog, news, "US".to_string(), 4);
    assert!(screener.screen(100, 5.0).await.is_err());
}

/// Full flow: screen, stream ticks (out of order, plus noise for an
/// unsubscribed symbol), rank against the snapshot, score sentiment.
#[tokio::test]
async fn test_full_pipeline_flow() {
    let catalog = Arc::new(MockCatalog::new(
        vec![
            listing("AAA", "AAA Corp"),
            listing("BBB", "BBB Inc"),
            listing("EXP", "Expensive Co"),
        ],
        vec![
            quote("AAA", 2.0, 500.0),
            quote("BBB", 3.5, 800.0),
            quote("EXP", 120.0, 99999.0),
        ],
    ));
    let news = Arc::new(MockNews::new(vec![
        (
            "AAA Corp",
            vec![
                article("AAA Corp posts strong quarterly gain, a great buy"),
                article("Analysts see further growth for AAA Corp"),
            ],
        ),
        (
            "BBB Inc",
            vec![article("BBB Inc misses estimates, terrible outlook")],
        ),
    ]));

    let screener = CandidateScreener::new(catalog, news, "US".to_string(), 4);
    let candidates = screener.screen(100, 5.0).await.unwrap();
    assert_eq!(candidates.len(), 2);

    // Live ticks for AAA only; BBB falls back to its quote volume.
    let aggregator = TradeStreamAggregator::new();
    aggregator.subscribe(candidates.iter().map(|c| c.symbol.clone()));
    aggregator.on_tick(&tick("AAA", 2.2, 600.0));
    aggregator.on_tick(&tick("AAA", 2.1, 400.0));
    aggregator.on_tick(&tick("ZZZ", 1.0, 10.0)); // unsubscribed noise

    let snapshot = aggregator.snapshot();
    assert_eq!(aggregator.dropped_ticks(), 1);

    let ranked = RankingEngine::rank(&candidates, &snapshot, 50);
    assert_eq!(ranked.len(), 2);

    // AAA: live volume 1000 beats BBB's static 800.
    assert_eq!(ranked[0].candidate.symbol, "AAA");
    let live = ranked[0].live.as_ref().unwrap();
    assert_eq!(live.tick_count, 2);
    assert!((live.total_volume - 1000.0).abs() < 1e-10);
    assert!((live.avg_price - 2.15).abs() < 1e-10);
    assert_eq!(ranked[1].candidate.symbol, "BBB");
    assert!(ranked[1].live.is_none());

    // Sentiment: AAA positive titles, BBB negative title.
    let sentiment = SentimentAggregator::new(Arc::new(LexiconScorer::new()));
    let outcome = sentiment.summarize(&ranked);
    assert_eq!(outcome.skipped, 0);

    let aaa = &outcome.summaries["AAA"];
    assert_eq!(aaa.scores.len(), 2);
    assert!(aaa.scores[0] > 0.0);

    let bbb = &outcome.summaries["BBB"];
    assert_eq!(bbb.scores.len(), 1);
    assert!(bbb.scores[0] < 0.0);
}

/// Snapshot taken mid-stream ranks on the data seen so far; a later
/// snapshot with more ticks can reorder, but both runs are internally
/// consistent and repeatable.
#[tokio::test]
async fn test_ranking_follows_snapshot_not_feed() {
    let catalog = Arc::new(MockCatalog::new(
        vec![listing("AAA", "AAA Corp"), listing("BBB", "BBB Inc")],
        vec![quote("AAA", 2.0, 100.0), quote("BBB", 3.0, 100.0)],
    ));
    let news = Arc::new(MockNews::new(vec![
        ("AAA Corp", vec![article("AAA Corp news")]),
        ("BBB Inc", vec![article("BBB Inc news")]),
    ]));

    let screener = CandidateScreener::new(catalog, news, "US".to_string(), 2);
    let candidates = screener.screen(100, 5.0).await.unwrap();

    let aggregator = TradeStreamAggregator::new();
    aggregator.subscribe(candidates.iter().map(|c| c.symbol.clone()));

    aggregator.on_tick(&tick("BBB", 3.0, 500.0));
    let early = aggregator.snapshot();

    aggregator.on_tick(&tick("AAA", 2.0, 2000.0));
    let late = aggregator.snapshot();

    let early_ranked = RankingEngine::rank(&candidates, &early, 50);
    assert_eq!(early_ranked[0].candidate.symbol, "BBB");

    let late_ranked = RankingEngine::rank(&candidates, &late, 50);
    assert_eq!(late_ranked[0].candidate.symbol, "AAA");

    // Same snapshot in, same order out.
    let replay = RankingEngine::rank(&candidates, &early, 50);
    assert_eq!(replay[0].candidate.symbol, "BBB");
}

/// The candidate cap holds even when the catalog has more eligible
/// symbols than the cap allows.
#[tokio::test]
async fn test_candidate_cap_enforced() {
    let listings: Vec<SymbolListing> = (0..20)
        .map(|i| listing(&format!("S{i:02}"), &format!("S{i:02} Corp")))
        .collect();
    let quotes: Vec<Quote> = (0..20)
        .map(|i| quote(&format!("S{i:02}"), 1.0, 100.0))
        .collect();
    let news_entries: Vec<(String, Vec<NewsItem>)> = (0..20)
        .map(|i| (format!("S{i:02} Corp"), vec![article("coverage")]))
        .collect();

    let catalog = Arc::new(MockCatalog::new(listings, quotes));
    let news = Arc::new(MockNews {
        by_query: news_entries.into_iter().collect(),
    });

    let screener = CandidateScreener::new(catalog, news, "US".to_string(), 4);
    let candidates = screener.screen(5, 5.0).await.unwrap();

    assert_eq!(candidates.len(), 5);
    // Catalog order is preserved under the cap.
    assert_eq!(candidates[0].symbol, "S00");
    assert_eq!(candidates[4].symbol, "S04");
}
