//! OpenAI briefing generator.
//!
//! Implements the `Summarizer` trait against the OpenAI Chat
//! Completions API. The prompt lists each ranked symbol with its
//! price, effective volume and mean sentiment; the model is asked
//! for a short trading-desk style briefing.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::Summarizer;
use crate::types::{RankedEntry, SentimentSummary, Symbol};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_MAX_TOKENS: u32 = 300;

const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 1000;

const SYSTEM_PROMPT: &str = "You are a market analyst writing a brief for a \
penny-stock screening desk. Given ranked symbols with volume and news \
sentiment, write a concise summary highlighting the most notable names. \
Plain prose, no financial advice.";

// ---------------------------------------------------------------------------
// API types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChatMessage>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct OpenAiClient {
    http: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: Option<String>, max_tokens: Option<u32>) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .context("Failed to build OpenAI HTTP client")?;

        Ok(Self {
            http,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        })
    }

    /// One line per ranked symbol, plus overall counts.
    fn build_prompt(
        ranked: &[RankedEntry],
        sentiment: &HashMap<Symbol, SentimentSummary>,
    ) -> String {
        let mut prompt = format!(
            "Screening session results, {} ranked symbols:\n\n",
            ranked.len()
        );

        for (i, entry) in ranked.iter().enumerate() {
            let mean = sentiment
                .get(&entry.candidate.symbol)
                .map(|s| format!("{:.2}", s.mean()))
                .unwrap_or_else(|| "n/a".to_string());

            let volume_kind = if entry.live.is_some() { "live" } else { "quote" };

            prompt.push_str(&format!(
                "{}. {} ({}) price {:.2}, {} volume {:.0}, range {:.2}, sentiment {}\n",
                i + 1,
                entry.candidate.symbol,
                entry.candidate.name,
                entry.candidate.quote.price,
                volume_kind,
                entry.rank_score,
                entry.candidate.quote.daily_range(),
                mean,
            ));
        }

        prompt.push_str("\nSummarize the session in a short paragraph.");
        prompt
    }

    async fn call_api(&self, user_message: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_message.to_string(),
                },
            ],
        };

        let mut last_error = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay = BASE_BACKOFF_MS * 2u64.pow(attempt - 1);
                tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
            }

            let resp = self
                .http
                .post(OPENAI_API_URL)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&request)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let body: ChatResponse = response
                            .json()
                            .await
                            .context("Failed to parse OpenAI response")?;

                        let text = body
                            .choices
                            .first()
                            .and_then(|c| c.message.as_ref())
                            .map(|m| m.content.clone())
                            .unwrap_or_default();

                        return Ok(text);
                    }

                    if status.as_u16() == 429 || status.as_u16() >= 500 {
                        let error_text = response.text().await.unwrap_or_default();
                        warn!(status = %status, attempt, "Retryable OpenAI error");
                        last_error = Some(format!("HTTP {status}: {error_text}"));
                        continue;
                    }

                    let error_text = response.text().await.unwrap_or_default();
                    anyhow::bail!("OpenAI API error {status}: {error_text}");
                }
                Err(e) => {
                    last_error = Some(format!("Request error: {e}"));
                    continue;
                }
            }
        }

        anyhow::bail!(
            "OpenAI API failed after {MAX_RETRIES} retries: {}",
            last_error.unwrap_or_default()
        )
    }
}

#[async_trait]
impl Summarizer for OpenAiClient {
    async fn summarize(
        &self,
        ranked: &[RankedEntry],
        sentiment: &HashMap<Symbol, SentimentSummary>,
    ) -> Result<String> {
        if ranked.is_empty() {
            return Ok("No candidates survived screening this session.".to_string());
        }

        let prompt = Self::build_prompt(ranked, sentiment);
        debug!(model = %self.model, symbols = ranked.len(), "Requesting briefing");
        self.call_api(&prompt).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
