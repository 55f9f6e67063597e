//! Sentiment scoring and aggregation.
//!
//! Defines the `SentimentScorer` seam (text → polarity in [-1, 1]), the
//! keyword-lexicon implementation, and the aggregator that attaches a
//! per-symbol sentiment summary to the ranked candidate list.

pub mod aggregator;
pub mod lexicon;

use anyhow::Result;

/// Abstraction over sentiment scorers.
///
/// Implementors map arbitrary text to a polarity in [-1.0, 1.0]:
/// negative = negative sentiment, positive = positive sentiment.
/// Scoring is synchronous and side-effect free.
pub trait SentimentScorer: Send + Sync {
    /// Score a piece of text. Errors are recoverable — the caller skips
    /// the item and continues.
    fn polarity(&self, text: &str) -> Result<f64>;

    /// Scorer name for logging and identification.
    fn name(&self) -> &str;
}
