//! Keyword-lexicon sentiment scorer.
//!
//! Scores headlines by counting positive and negative financial-news
//! keywords: polarity = (pos - neg) / (pos + neg), 0.0 when no keyword
//! matches. Deliberately simple and deterministic; the trait seam allows
//! swapping in a model-backed scorer later.

use anyhow::Result;

use super::SentimentScorer;

const POSITIVE_WORDS: &[&str] = &[
    "win", "success", "gain", "rise", "surge", "approve", "agree", "pass",
    "breakthrough", "progress", "strong", "boost", "improve", "record",
    "optimistic", "confident", "support", "growth", "beat", "rally",
    "upgrade", "buy",
];

const NEGATIVE_WORDS: &[&str] = &[
    "lose", "fail", "drop", "fall", "crash", "reject", "oppose", "block",
    "crisis", "collapse", "weak", "decline", "worst", "threat", "risk",
    "pessimistic", "concern", "fear", "scandal", "miss", "downgrade",
    "sell", "terrible", "probe", "lawsuit",
];

/// Deterministic keyword-based sentiment scorer.
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> Result<f64> {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();
        if words.is_empty() {
            return Ok(0.0);
        }

        let pos = words
            .iter()
            .filter(|w| POSITIVE_WORDS.iter().any(|pw| w.contains(pw)))
            .count() as f64;

        let neg = words
            .iter()
            .filter(|w| NEGATIVE_WORDS.iter().any(|nw| w.contains(nw)))
            .count() as f64;

        let denom = pos + neg;
        if denom == 0.0 {
            return Ok(0.0);
        }

        Ok((pos - neg) / denom)
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
