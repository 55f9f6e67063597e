//! PENNYSCOUT — penny-stock screening and live-ranking agent.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! and runs the screen→stream→rank→sentiment session loop with
//! graceful shutdown.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use pennyscout::config;
use pennyscout::engine::ranker::RankingEngine;
use pennyscout::engine::screener::CandidateScreener;
use pennyscout::llm::openai::OpenAiClient;
use pennyscout::llm::Summarizer;
use pennyscout::market::finnhub::FinnhubClient;
use pennyscout::news::newsapi::NewsApiClient;
use pennyscout::sentiment::aggregator::SentimentAggregator;
use pennyscout::sentiment::lexicon::LexiconScorer;
use pennyscout::stream::{FeedSettings, TradeFeed, TradeStreamAggregator};
use pennyscout::types::{RankedEntry, SentimentSummary, Symbol};

const BANNER: &str = r#"
 ____  _____ _   _ _   ___   ______   ____ ___  _   _ _____
|  _ \| ____| \ | | \ | \ \ / / ___| / ___/ _ \| | | |_   _|
| |_) |  _| |  \| |  \| |\ V /\___ \| |  | | | | | | | | |
|  __/| |___| |\  | |\  | | |  ___) | |__| |_| | |_| | | |
|_|   |_____|_| \_|_| \_| |_| |____/ \____\___/ \___/  |_|

  Penny-stock screening, live-tick ranking and sentiment
  v0.1.0 — Autonomous Agent
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = config::AppConfig::load("config.toml")?;

    init_logging();

    println!("{BANNER}");
    info!(
        agent_name = %cfg.agent.name,
        session_interval_secs = cfg.agent.session_interval_secs,
        exchange = %cfg.screener.exchange,
        price_threshold = cfg.screener.price_threshold,
        "PENNYSCOUT starting up"
    );

    // -- Initialise components -------------------------------------------

    let market_key = config::AppConfig::resolve_env(&cfg.screener.api_key_env)?;
    let catalog = Arc::new(FinnhubClient::new(market_key.clone())?);

    let news_key = config::AppConfig::resolve_env(&cfg.news.api_key_env)?;
    let news = Arc::new(NewsApiClient::new(news_key)?);

    let screener = CandidateScreener::new(
        catalog,
        news,
        cfg.screener.exchange.clone(),
        cfg.screener.fetch_concurrency,
    );

    let aggregator = Arc::new(TradeStreamAggregator::new());
    let sentiment = SentimentAggregator::new(Arc::new(LexiconScorer::new()));

    let summarizer: Option<Box<dyn Summarizer>> = if cfg.llm.enabled {
        match std::env::var(&cfg.llm.api_key_env) {
            Ok(key) if !key.is_empty() => {
                info!(model = %cfg.llm.model, "LLM briefing enabled");
                Some(Box::new(OpenAiClient::new(
                    key,
                    Some(cfg.llm.model.clone()),
                    Some(cfg.llm.max_tokens),
                )?))
            }
            _ => {
                warn!("LLM enabled but no API key set — briefings disabled");
                None
            }
        }
    } else {
        None
    };

    // -- Main loop -------------------------------------------------------

    let session_interval = Duration::from_secs(cfg.agent.session_interval_secs);
    let mut interval = tokio::time::interval(session_interval);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut session: u64 = 0;

    info!(
        interval_secs = cfg.agent.session_interval_secs,
        "Entering main loop. Press Ctrl+C to stop."
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                session += 1;
                match run_session(
                    &cfg, &market_key, &screener, &aggregator, &sentiment,
                    summarizer.as_deref(), session,
                ).await {
                    Ok(report) => log_session_report(&report),
                    Err(e) => {
                        error!(error = %e, session, "Session failed — continuing to next");
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!(sessions = session, "PENNYSCOUT shut down cleanly.");
    Ok(())
}

/// Outcome of one screening session, for the end-of-session log line.
struct SessionReport {
    session: u64,
    candidates: usize,
    ticks: u64,
    dropped_ticks: u64,
    ranked: Vec<RankedEntry>,
    sentiment: HashMap<Symbol, SentimentSummary>,
    sentiment_skipped: usize,
    briefing: Option<String>,
}

/// Run a single screen→subscribe→settle→rank→sentiment session.
async fn run_session(
    cfg: &config::AppConfig,
    market_key: &str,
    screener: &CandidateScreener,
    aggregator: &Arc<TradeStreamAggregator>,
    sentiment: &SentimentAggregator,
    summarizer: Option<&dyn Summarizer>,
    session: u64,
) -> Result<SessionReport> {
    info!(session, "Starting screening session");

    // Fresh aggregates per session.
    aggregator.reset();

    // 1. Screen the catalog down to a bounded candidate set.
    let candidates = screener
        .screen(cfg.screener.max_candidates, cfg.screener.price_threshold)
        .await?;
    info!(count = candidates.len(), "Candidates screened");

    // 2. Stream ticks for the candidate symbols until the settle window ends.
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let mut feed_task = None;

    if cfg.feed.enabled && !candidates.is_empty() {
        aggregator.subscribe(candidates.iter().map(|c| c.symbol.clone()));

        let feed = TradeFeed::new(
            FeedSettings {
                ws_url: cfg.feed.ws_url.clone(),
                api_token: market_key.to_string(),
            },
            Arc::clone(aggregator),
        );
        let feed_rx = shutdown_tx.subscribe();
        feed_task = Some(tokio::spawn(async move { feed.run(feed_rx).await }));

        tokio::time::sleep(Duration::from_secs(cfg.feed.settle_secs)).await;
    }

    // 3. Point-in-time snapshot, then stop the feed.
    let snapshot = aggregator.snapshot();
    let _ = shutdown_tx.send(());

    if let Some(task) = feed_task {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Trade feed ended with error"),
            Err(e) => warn!(error = %e, "Trade feed task panicked"),
        }
    }

    let ticks: u64 = snapshot.values().map(|a| a.tick_count).sum();

    // 4. Rank and score sentiment.
    let ranked = RankingEngine::rank(&candidates, &snapshot, cfg.ranking.top_n);
    let outcome = sentiment.summarize(&ranked);

    // 5. Optional LLM briefing.
    let briefing = match summarizer {
        Some(s) => match s.summarize(&ranked, &outcome.summaries).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "Briefing generation failed");
                None
            }
        },
        None => None,
    };

    Ok(SessionReport {
        session,
        candidates: candidates.len(),
        ticks,
        dropped_ticks: aggregator.dropped_ticks(),
        ranked,
        sentiment: outcome.summaries,
        sentiment_skipped: outcome.skipped,
        briefing,
    })
}

/// Log a human-readable session summary.
fn log_session_report(report: &SessionReport) {
    info!(
        session = report.session,
        candidates = report.candidates,
        ticks = report.ticks,
        dropped = report.dropped_ticks,
        ranked = report.ranked.len(),
        sentiment_skipped = report.sentiment_skipped,
        "Session complete"
    );

    for (i, entry) in report.ranked.iter().take(10).enumerate() {
        let mean = report
            .sentiment
            .get(&entry.candidate.symbol)
            .map(|s| s.mean())
            .unwrap_or(0.0);
        info!(
            rank = i + 1,
            symbol = %entry.candidate.symbol,
            price = format!("{:.2}", entry.candidate.quote.price),
            volume = format!("{:.0}", entry.rank_score),
            live = entry.live.is_some(),
            sentiment = format!("{mean:.2}"),
            "Ranked"
        );
    }

    if let Some(briefing) = &report.briefing {
        info!(briefing = %briefing, "Session briefing");
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pennyscout=info"));

    let json_logging = std::env::var("PENNYSCOUT_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
