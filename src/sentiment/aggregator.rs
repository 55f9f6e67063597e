//! Per-symbol sentiment aggregation over the ranked candidate list.
//!
//! Scores each candidate's news titles through the configured
//! `SentimentScorer` and collects the polarities into order-preserving
//! per-symbol summaries. A scorer failure on one item skips that item
//! only; it never aborts the pass.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::SentimentScorer;
use crate::types::{RankedEntry, SentimentSummary, Symbol};

/// Result of one summarization pass.
#[derive(Debug)]
pub struct SentimentOutcome {
    pub summaries: HashMap<Symbol, SentimentSummary>,
    /// News items whose scoring failed and was skipped.
    pub skipped: usize,
}

/// Maps ranked candidates' news through the scorer.
pub struct SentimentAggregator {
    scorer: Arc<dyn SentimentScorer>,
}

impl SentimentAggregator {
    pub fn new(scorer: Arc<dyn SentimentScorer>) -> Self {
        Self { scorer }
    }

    /// Build one `SentimentSummary` per ranked entry.
    ///
    /// Titles are scored (not snippets), in news order. Entries with no
    /// news yield an empty score list rather than an error.
    pub fn summarize(&self, entries: &[RankedEntry]) -> SentimentOutcome {
        let mut summaries = HashMap::with_capacity(entries.len());
        let mut skipped = 0usize;

        for entry in entries {
            let symbol = entry.candidate.symbol.clone();
            let mut summary = SentimentSummary::new(symbol.clone());

            for item in &entry.candidate.news {
                match self.scorer.polarity(&item.title) {
                    Ok(score) => summary.scores.push(score),
                    Err(e) => {
                        warn!(
                            symbol = %symbol,
                            title = %item.title,
                            error = %e,
                            "Scoring failed, skipping item"
                        );
                        skipped += 1;
                    }
                }
            }

            debug!(symbol = %symbol, scores = summary.scores.len(), mean = summary.mean(), "Sentiment summarised");
            summaries.insert(symbol, summary);
        }

        SentimentOutcome { summaries, skipped }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Candidate, NewsItem};
    use anyhow::Result;

    /// Scorer returning canned values in sequence, or failing on marked text.
    struct ScriptedScorer {
        scores: Vec<f64>,
        cursor: std::sync::Mutex<usize>,
    }

    impl ScriptedScorer {
        fn new(scores: Vec<f64>) -> Self {
            Self {
                scores,
                cursor: std::sync::Mutex::new(0),
            }
        }
    }

    impl SentimentScorer for ScriptedScorer {
        fn polarity(&self, text: &str) -> Result<f64> {
            if text.contains("FAIL") {
                anyhow::bail!("scripted failure");
            }
            let mut cursor = self.cursor.lock().unwrap();
            let score = self.scores[*cursor % self.scores.len()];
            *cursor += 1;
            Ok(score)
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn entry_with_titles(symbol: &str, titles: &[&str]) -> RankedEntry {
        let mut candidate = Candidate::sample(symbol, 2.0, 500.0);
        candidate.news = titles
            .iter()
            .map(|t| NewsItem {
                title: t.to_string(),
                snippet: String::new(),
                link: String::new(),
            })
            .collect();
        RankedEntry {
            candidate,
            live: None,
            rank_score: 500.0,
        }
    }

    #[test]
    fn test_summarize_preserves_order() {
        let agg = SentimentAggregator::new(Arc::new(ScriptedScorer::new(vec![0.8, -0.6])));
        let entries = vec![entry_with_titles("AAA", &["great buy", "terrible outlook"])];

        let outcome = agg.summarize(&entries);
        let summary = &outcome.summaries["AAA"];
        assert_eq!(summary.scores, vec![0.8, -0.6]);
        assert_eq!(outcome.skipped, 0);
    }

    #[test]
    fn test_summarize_no_news_yields_empty_summary() {
        let agg = SentimentAggregator::new(Arc::new(ScriptedScorer::new(vec![0.5])));
        let entries = vec![entry_with_titles("AAA", &[])];

        let outcome = agg.summarize(&entries);
        assert!(outcome.summaries["AAA"].scores.is_empty());
        assert_eq!(outcome.skipped, 0);
    }

    #[test]
    fn test_summarize_skips_failed_items() {
        let agg = SentimentAggregator::new(Arc::new(ScriptedScorer::new(vec![0.3])));
        let entries = vec![entry_with_titles("AAA", &["fine", "FAIL here", "also fine"])];

        let outcome = agg.summarize(&entries);
        assert_eq!(outcome.summaries["AAA"].scores.len(), 2);
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn test_summarize_one_summary_per_entry() {
        let agg = SentimentAggregator::new(Arc::new(ScriptedScorer::new(vec![0.1])));
        let entries = vec![
            entry_with_titles("AAA", &["x"]),
            entry_with_titles("BBB", &["y", "z"]),
        ];

        let outcome = agg.summarize(&entries);
        assert_eq!(outcome.summaries.len(), 2);
        assert_eq!(outcome.summaries["BBB"].scores.len(), 2);
    }
}
