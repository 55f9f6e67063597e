//! LLM integration for session briefings.
//!
//! Defines the `Summarizer` trait and provides an OpenAI-backed
//! implementation that turns the ranked list plus sentiment digest
//! into a short natural-language briefing.

pub mod openai;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{RankedEntry, SentimentSummary, Symbol};

/// Abstraction over briefing generators.
///
/// Implementors receive the ranked candidates and their per-symbol
/// sentiment and produce prose for the session report.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Generate a briefing covering the ranked list and its sentiment.
    async fn summarize(
        &self,
        ranked: &[RankedEntry],
        sentiment: &HashMap<Symbol, SentimentSummary>,
    ) -> Result<String>;

    /// Model identifier string.
    fn model_name(&self) -> &str;
}
