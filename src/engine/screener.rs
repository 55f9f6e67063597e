//! Penny-stock candidate screener.
//!
//! Walks the exchange catalog in catalog order, keeps common-equity
//! symbols priced under the configured threshold that carry at least one
//! recent news item, and stops as soon as the candidate cap is reached.
//! The early stop caps worst-case latency against an unbounded catalog:
//! the scan is not expected to cover everything once the cap is hit.
//!
//! Per-symbol quote and news fetches run on a bounded concurrent worker
//! pool; completion order cannot affect the result because candidates are
//! collected in catalog order, filtered rather than merged positionally.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::market::{MarketCatalogSource, SymbolListing};
use crate::news::NewsLookup;
use crate::types::{Candidate, PennyScoutError, MAX_NEWS_ITEMS};

/// Screens the symbol universe into a bounded candidate set.
pub struct CandidateScreener {
    catalog: Arc<dyn MarketCatalogSource>,
    news: Arc<dyn NewsLookup>,
    /// Catalog exchange code passed to `list_symbols`.
    exchange: String,
    /// Bounded worker pool size for per-symbol fetches.
    fetch_concurrency: usize,
}

impl CandidateScreener {
    pub fn new(
        catalog: Arc<dyn MarketCatalogSource>,
        news: Arc<dyn NewsLookup>,
        exchange: String,
        fetch_concurrency: usize,
    ) -> Self {
        Self {
            catalog,
            news,
            exchange,
            fetch_concurrency: fetch_concurrency.max(1),
        }
    }

    /// Run one screening pass.
    ///
    /// A catalog failure is fatal (`PennyScoutError::CatalogUnavailable`);
    /// per-symbol failures are logged, counted, and skipped. The result is
    /// in catalog scan order and never exceeds `max_candidates`.
    pub async fn screen(
        &self,
        max_candidates: usize,
        price_threshold: f64,
    ) -> Result<Vec<Candidate>> {
        let listings = self
            .catalog
            .list_symbols(&self.exchange)
            .await
            .map_err(|e| PennyScoutError::CatalogUnavailable(e.to_string()))?;

        info!(
            catalog = listings.len(),
            exchange = %self.exchange,
            price_threshold,
            max_candidates,
            "Starting screening pass"
        );

        let fetch_failures = AtomicUsize::new(0);
        let common: Vec<SymbolListing> = listings
            .into_iter()
            .filter(|l| l.is_common_equity())
            .collect();
        let considered = common.len();

        // `buffered` keeps up to `fetch_concurrency` probes in flight while
        // yielding results in catalog order. Dropping the stream at the cap
        // cancels whatever is still in flight.
        let mut probes = futures::stream::iter(common)
            .map(|listing| self.probe(listing, price_threshold, &fetch_failures))
            .buffered(self.fetch_concurrency);

        let mut candidates: Vec<Candidate> = Vec::with_capacity(max_candidates);

        while let Some(result) = probes.next().await {
            if let Some(candidate) = result {
                debug!(candidate = %candidate, "Candidate accepted");
                candidates.push(candidate);
                if candidates.len() >= max_candidates {
                    info!(cap = max_candidates, "Candidate cap reached, stopping scan early");
                    break;
                }
            }
        }
        drop(probes);

        info!(
            candidates = candidates.len(),
            considered,
            fetch_failures = fetch_failures.load(Ordering::Relaxed),
            "Screening pass complete"
        );

        Ok(candidates)
    }

    /// Probe one catalog listing: quote, price filter, then news.
    /// Any per-symbol failure skips the symbol and keeps the scan alive.
    async fn probe(
        &self,
        listing: SymbolListing,
        price_threshold: f64,
        fetch_failures: &AtomicUsize,
    ) -> Option<Candidate> {
        let quote = match self.catalog.get_quote(&listing.symbol).await {
            Ok(Some(q)) => q,
            Ok(None) => {
                debug!(symbol = %listing.symbol, "No usable quote, skipping");
                return None;
            }
            Err(e) => {
                warn!(symbol = %listing.symbol, error = %e, "Quote fetch failed, skipping symbol");
                fetch_failures.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        if quote.price >= price_threshold {
            return None;
        }

        // Company name gives better news hits than the raw ticker.
        let query = if listing.name.is_empty() {
            listing.symbol.clone()
        } else {
            listing.name.clone()
        };

        let mut news = match self.news.fetch_news(&query).await {
            Ok(items) => items,
            Err(e) => {
                warn!(symbol = %listing.symbol, error = %e, "News fetch failed, skipping symbol");
                fetch_failures.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        if news.is_empty() {
            debug!(symbol = %listing.symbol, "No recent news, skipping");
            return None;
        }
        news.truncate(MAX_NEWS_ITEMS);

        Some(Candidate {
            symbol: listing.symbol,
            name: listing.name,
            quote,
            news,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
