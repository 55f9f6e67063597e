//! Websocket trade-feed subscriber.
//!
//! Owns the connection lifecycle: connect, send one subscribe message per
//! symbol, then pump inbound trade batches into the aggregator until the
//! server closes, an error occurs, or a shutdown signal arrives.
//! Disconnects never clear accumulated state — ingestion pauses and the
//! client reconnects with exponential backoff.
//!
//! Wire protocol:
//!   outbound `{"type":"subscribe","symbol":"AAA"}`
//!   inbound  `{"type":"trade","data":[{"s":"AAA","p":2.31,"v":100,"t":1693212345678}, ...]}`

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use super::TradeStreamAggregator;
use crate::types::{PennyScoutError, TradeTick};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Initial reconnection delay.
const INITIAL_RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Maximum reconnection delay.
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(60);

/// Maximum reconnection attempts before giving up.
const MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Trade feed settings.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    /// Websocket URL, without the auth token.
    pub ws_url: String,
    /// API token appended as a query param.
    pub api_token: String,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SubscribeMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    symbol: &'a str,
}

impl<'a> SubscribeMessage<'a> {
    fn new(symbol: &'a str) -> Self {
        Self {
            kind: "subscribe",
            symbol,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeedMessage {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    data: Vec<RawTrade>,
}

#[derive(Debug, Deserialize)]
struct RawTrade {
    /// Symbol.
    s: String,
    /// Price.
    p: f64,
    /// Volume.
    v: f64,
    /// Trade timestamp, milliseconds since epoch.
    #[serde(default)]
    t: i64,
}

/// What one inbound text frame contained.
#[derive(Debug)]
enum Frame {
    Trades(Vec<TradeTick>),
    Ping,
    Control,
}

fn parse_frame(text: &str) -> Result<Frame> {
    let msg: FeedMessage =
        serde_json::from_str(text).context("Unparseable feed frame")?;

    match msg.kind.as_str() {
        "trade" => {
            let ticks = msg
                .data
                .into_iter()
                .map(|raw| TradeTick {
                    symbol: raw.s,
                    price: raw.p,
                    volume: raw.v,
                    timestamp: Utc
                        .timestamp_millis_opt(raw.t)
                        .single()
                        .unwrap_or_else(Utc::now),
                })
                .collect();
            Ok(Frame::Trades(ticks))
        }
        "ping" => Ok(Frame::Ping),
        _ => Ok(Frame::Control),
    }
}

// ---------------------------------------------------------------------------
// Feed client
// ---------------------------------------------------------------------------

/// Long-lived websocket subscriber feeding a [`TradeStreamAggregator`].
pub struct TradeFeed {
    settings: FeedSettings,
    aggregator: Arc<TradeStreamAggregator>,
}

impl TradeFeed {
    pub fn new(settings: FeedSettings, aggregator: Arc<TradeStreamAggregator>) -> Self {
        Self {
            settings,
            aggregator,
        }
    }

    /// Run the subscription until shutdown or the reconnect budget is spent.
    ///
    /// Each disconnect is recoverable: the aggregator keeps its state and
    /// the client retries with exponential backoff.
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let symbols = self.aggregator.subscribed_symbols();
        if symbols.is_empty() {
            info!("No symbols subscribed, feed not started");
            return Ok(());
        }

        info!(symbols = symbols.len(), "Starting trade feed");

        let mut reconnect_attempts = 0u32;
        let mut current_delay = INITIAL_RECONNECT_DELAY;

        loop {
            if shutdown_rx.try_recv().is_ok() {
                info!("Shutdown signal received, stopping feed connection attempts");
                return Ok(());
            }

            match self
                .connect_and_pump(&symbols, shutdown_rx.resubscribe())
                .await
            {
                Ok(()) => {
                    info!("Trade feed ended normally");
                    return Ok(());
                }
                Err(e) => {
                    reconnect_attempts += 1;
                    warn!(
                        error = %e,
                        attempt = reconnect_attempts,
                        max = MAX_RECONNECT_ATTEMPTS,
                        "Trade feed disconnected, state preserved"
                    );

                    if reconnect_attempts >= MAX_RECONNECT_ATTEMPTS {
                        return Err(PennyScoutError::FeedDisconnected(format!(
                            "max reconnection attempts ({MAX_RECONNECT_ATTEMPTS}) exceeded: {e}"
                        ))
                        .into());
                    }

                    tokio::select! {
                        _ = sleep(current_delay) => {
                            current_delay = std::cmp::min(current_delay * 2, MAX_RECONNECT_DELAY);
                        }
                        _ = shutdown_rx.recv() => {
                            info!("Shutdown signal received during reconnect delay");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// One connection: subscribe to every symbol, then pump frames into
    /// the aggregator until close, error, or shutdown.
    async fn connect_and_pump(
        &self,
        symbols: &[String],
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        let url = format!(
            "{}?token={}",
            self.settings.ws_url,
            urlencoding::encode(&self.settings.api_token),
        );

        let (ws_stream, _) = connect_async(&url)
            .await
            .context("Failed to connect to trade feed")?;

        debug!(url = %self.settings.ws_url, "Trade feed connected");
        let (mut write, mut read) = ws_stream.split();

        for symbol in symbols {
            let msg = serde_json::to_string(&SubscribeMessage::new(symbol))
                .context("Failed to serialize subscribe message")?;
            write
                .send(Message::Text(msg))
                .await
                .with_context(|| format!("Failed to subscribe to {symbol}"))?;
        }
        info!(count = symbols.len(), "Subscriptions sent");

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            match parse_frame(&text) {
                                Ok(Frame::Trades(ticks)) => {
                                    for tick in &ticks {
                                        self.aggregator.on_tick(tick);
                                    }
                                }
                                Ok(Frame::Ping) => {
                                    let pong = r#"{"type":"pong"}"#.to_string();
                                    if let Err(e) = write.send(Message::Text(pong)).await {
                                        warn!(error = %e, "Failed to answer feed ping");
                                    }
                                }
                                Ok(Frame::Control) => {}
                                Err(e) => {
                                    warn!(error = %e, "Skipping unparseable frame");
                                }
                            }
                        }
                        Some(Ok(Message::Ping(payload))) => {
                            if let Err(e) = write.send(Message::Pong(payload)).await {
                                warn!(error = %e, "Failed to send pong");
                            }
                        }
                        Some(Ok(Message::Close(_))) => {
                            anyhow::bail!("feed closed by server");
                        }
                        Some(Err(e)) => {
                            return Err(e).context("Feed read error");
                        }
                        None => {
                            anyhow::bail!("feed stream ended");
                        }
                        _ => continue,
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, closing feed gracefully");
                    if let Err(e) = write.send(Message::Close(None)).await {
                        warn!(error = %e, "Failed to send close frame");
                    }
                    return Ok(());
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_message_shape() {
        let json = serde_json::to_string(&SubscribeMessage::new("AAA")).unwrap();
        assert_eq!(json, r#"{"type":"subscribe","symbol":"AAA"}"#);
    }

    #[test]
    fn test_parse_trade_frame() {
        let text = r#"{"type":"trade","data":[
            {"s":"AAA","p":2.31,"v":100,"t":1693212345678},
            {"s":"BBB","p":1.05,"v":50,"t":1693212345999}
        ]}"#;
        match parse_frame(text).unwrap() {
            Frame::Trades(ticks) => {
                assert_eq!(ticks.len(), 2);
                assert_eq!(ticks[0].symbol, "AAA");
                assert!((ticks[0].price - 2.31).abs() < 1e-10);
                assert!((ticks[1].volume - 50.0).abs() < 1e-10);
            }
            other => panic!("expected trades, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_ping_frame() {
        match parse_frame(r#"{"type":"ping"}"#).unwrap() {
            Frame::Ping => {}
            other => panic!("expected ping, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_control_frame() {
        // Subscription acks and unknown kinds are tolerated silently.
        match parse_frame(r#"{"type":"subscribed","symbol":"AAA"}"#).unwrap() {
            Frame::Control => {}
            other => panic!("expected control, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_garbage_frame_errors() {
        assert!(parse_frame("not json at all").is_err());
    }

    #[test]
    fn test_trade_frame_timestamp_conversion() {
        let text = r#"{"type":"trade","data":[{"s":"AAA","p":1.0,"v":1,"t":1693212345678}]}"#;
        match parse_frame(text).unwrap() {
            Frame::Trades(ticks) => {
                assert_eq!(ticks[0].timestamp.timestamp_millis(), 1693212345678);
            }
            other => panic!("expected trades, got {other:?}"),
        }
    }
}
