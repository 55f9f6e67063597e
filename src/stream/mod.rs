//! Live trade-stream ingestion.
//!
//! `aggregator` owns the per-symbol running statistics and their
//! synchronization discipline; `feed` owns the websocket connection
//! lifecycle and pumps inbound trade batches into the aggregator.
//! Accumulated state survives feed disconnects — accumulation simply
//! pauses until the connection recovers.

pub mod aggregator;
pub mod feed;

pub use aggregator::TradeStreamAggregator;
pub use feed::{FeedSettings, TradeFeed};
