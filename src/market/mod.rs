//! Market data integrations.
//!
//! Defines the `MarketCatalogSource` trait and provides the Finnhub-backed
//! implementation. The catalog is the authoritative symbol universe; quotes
//! are point-in-time snapshots re-fetched on every screening pass.

pub mod finnhub;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{Quote, Symbol};

/// One row of the exchange symbol catalog.
#[derive(Debug, Clone)]
pub struct SymbolListing {
    pub symbol: Symbol,
    /// Company name / security description.
    pub name: String,
    /// Instrument type as reported by the catalog, e.g. "Common Stock".
    pub instrument_type: String,
}

impl SymbolListing {
    /// Whether this listing is a common-equity instrument the screener
    /// should consider at all.
    pub fn is_common_equity(&self) -> bool {
        self.instrument_type.eq_ignore_ascii_case("common stock")
            || self.instrument_type.eq_ignore_ascii_case("equity")
    }
}

/// Abstraction over the market-data catalog and quote source.
///
/// A failed `get_quote` for one symbol is always recoverable (skip the
/// symbol); a failed `list_symbols` is fatal to the screening pass.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketCatalogSource: Send + Sync {
    /// Fetch the full tradable symbol list for an exchange.
    async fn list_symbols(&self, exchange: &str) -> Result<Vec<SymbolListing>>;

    /// Fetch a point-in-time quote. `Ok(None)` means the source has no
    /// usable price for the symbol (delisted, halted, or unpriced).
    async fn get_quote(&self, symbol: &str) -> Result<Option<Quote>>;

    /// Source name for logging and identification.
    fn name(&self) -> &str;
}
