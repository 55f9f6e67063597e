//! Per-symbol trade-tick aggregation.
//!
//! Encapsulates the shared real-time state behind `subscribe` / `on_tick` /
//! `snapshot` — never exposed as a bare shared map. Exactly one ingestion
//! path mutates the aggregates; any number of readers take point-in-time
//! snapshots. The accumulation is count + sums only, so tick delivery
//! order never affects the result, only how complete it is.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use tracing::{debug, info};

use crate::types::{Symbol, SymbolAggregate, TradeTick};

struct AggregatorState {
    subscribed: HashSet<Symbol>,
    aggregates: HashMap<Symbol, SymbolAggregate>,
}

/// Accumulates running statistics from an unordered, best-effort tick feed.
///
/// Lifecycle: aggregates are created on first subscription, persist for the
/// screening session, and are cleared by `reset()` between sessions.
pub struct TradeStreamAggregator {
    state: RwLock<AggregatorState>,
    /// Ticks ignored because their symbol was not subscribed.
    dropped: AtomicU64,
}

impl TradeStreamAggregator {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(AggregatorState {
                subscribed: HashSet::new(),
                aggregates: HashMap::new(),
            }),
            dropped: AtomicU64::new(0),
        }
    }

    /// Add symbols to the subscription set, creating empty aggregates.
    pub fn subscribe<I>(&self, symbols: I)
    where
        I: IntoIterator<Item = Symbol>,
    {
        let mut state = self.state.write().expect("aggregator lock poisoned");
        let mut added = 0usize;
        for symbol in symbols {
            if state.subscribed.insert(symbol.clone()) {
                state
                    .aggregates
                    .insert(symbol.clone(), SymbolAggregate::new(symbol));
                added += 1;
            }
        }
        info!(added, total = state.subscribed.len(), "Symbols subscribed");
    }

    /// Current subscription set, for building feed subscribe messages.
    pub fn subscribed_symbols(&self) -> Vec<Symbol> {
        let state = self.state.read().expect("aggregator lock poisoned");
        state.subscribed.iter().cloned().collect()
    }

    /// Fold one tick into its symbol's aggregate. O(1).
    /// Ticks for unsubscribed symbols are dropped, not errored.
    pub fn on_tick(&self, tick: &TradeTick) {
        let mut state = self.state.write().expect("aggregator lock poisoned");
        if !state.subscribed.contains(&tick.symbol) {
            drop(state);
            self.dropped.fetch_add(1, Ordering::Relaxed);
            debug!(symbol = %tick.symbol, "Dropped tick for unsubscribed symbol");
            return;
        }

        state
            .aggregates
            .entry(tick.symbol.clone())
            .or_insert_with(|| SymbolAggregate::new(tick.symbol.clone()))
            .apply(tick);
    }

    /// Point-in-time copy of all aggregates. Readers get a consistent view
    /// and never hold up ingestion beyond the cost of the copy.
    pub fn snapshot(&self) -> HashMap<Symbol, SymbolAggregate> {
        let state = self.state.read().expect("aggregator lock poisoned");
        state.aggregates.clone()
    }

    /// Clear subscriptions and aggregates between screening sessions.
    pub fn reset(&self) {
        let mut state = self.state.write().expect("aggregator lock poisoned");
        state.subscribed.clear();
        state.aggregates.clear();
        self.dropped.store(0, Ordering::Relaxed);
        debug!("Aggregator reset");
    }

    /// Count of ticks dropped for unsubscribed symbols.
    pub fn dropped_ticks(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for TradeStreamAggregator {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
