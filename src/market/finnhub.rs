//! Finnhub market-data integration.
//!
//! Supplies the exchange symbol catalog and per-symbol quotes for the
//! screener.
//!
//! API docs: https://finnhub.io/docs/api
//! Base URL: https://finnhub.io/api/v1
//! Rate limit: 60 requests/minute on the free tier.
//! Auth: API key via `token` query param.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{MarketCatalogSource, SymbolListing};
use crate::types::Quote;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const BASE_URL: &str = "https://finnhub.io/api/v1";
const SOURCE_NAME: &str = "finnhub";

// ---------------------------------------------------------------------------
// API response types (Finnhub JSON → Rust)
// ---------------------------------------------------------------------------

/// One entry of `/stock/symbol`. We only deserialize the fields we need.
#[derive(Debug, Deserialize)]
struct FinnhubSymbol {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    description: String,
    /// "Common Stock", "ETP", "ADR", ...
    #[serde(default, rename = "type")]
    instrument_type: String,
}

/// Response of `/quote`. All fields default so a malformed or empty payload
/// degrades to "no usable quote" instead of a parse error.
#[derive(Debug, Deserialize)]
struct FinnhubQuote {
    /// Current price.
    #[serde(default)]
    c: Option<f64>,
    /// Daily high.
    #[serde(default)]
    h: f64,
    /// Daily low.
    #[serde(default)]
    l: f64,
    /// Daily cumulative volume.
    #[serde(default)]
    v: f64,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Finnhub catalog + quote client.
pub struct FinnhubClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl FinnhubClient {
    pub fn new(api_key: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("PENNYSCOUT/0.1.0 (penny-stock-agent)")
            .build()
            .context("Failed to build HTTP client for Finnhub")?;

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
}

#[async_trait]
impl MarketCatalogSource for FinnhubClient {
    async fn list_symbols(&self, exchange: &str) -> Result<Vec<SymbolListing>> {
        let url = format!(
            "{}/stock/symbol?exchange={}&token={}",
            self.base_url,
            urlencoding::encode(exchange),
            self.api_key,
        );

        debug!(exchange, "Fetching symbol catalog");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("Catalog request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Catalog fetch returned HTTP {status}");
        }

        let raw: Vec<FinnhubSymbol> = resp
            .json()
            .await
            .context("Failed to parse symbol catalog payload")?;

        let listings: Vec<SymbolListing> = raw
            .into_iter()
            .filter(|s| !s.symbol.is_empty())
            .map(|s| SymbolListing {
                symbol: s.symbol,
                name: s.description,
                instrument_type: s.instrument_type,
            })
            .collect();

        debug!(count = listings.len(), exchange, "Symbol catalog fetched");
        Ok(listings)
    }

    async fn get_quote(&self, symbol: &str) -> Result<Option<Quote>> {
        let url = format!(
            "{}/quote?symbol={}&token={}",
            self.base_url,
            urlencoding::encode(symbol),
            self.api_key,
        );

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Quote request failed for {symbol}"))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Quote fetch for {symbol} returned HTTP {status}");
        }

        let raw: FinnhubQuote = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse quote payload for {symbol}"))?;

        // Finnhub reports price 0 / null for unknown or unpriced symbols.
        let price = match raw.c {
            Some(p) if p > 0.0 => p,
            _ => {
                debug!(symbol, "No usable price in quote");
                return Ok(None);
            }
        };

        Ok(Some(Quote {
            symbol: symbol.to_string(),
            price,
            high: raw.h,
            low: raw.l,
            volume: raw.v,
            fetched_at: Utc::now(),
        }))
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
