//! Liquidity/volatility ranking over screened candidates.
//!
//! Merges the candidate set with a point-in-time aggregate snapshot:
//! streamed volume is preferred whenever a live aggregate with at least
//! one tick exists, otherwise the static quote volume stands in. The sort
//! is liquidity first, then daily range — among equally liquid names the
//! more volatile one ranks higher.
//!
//! Pure projection: no state, same inputs always give the same output.

use std::collections::HashMap;

use crate::types::{Candidate, LiveStats, RankedEntry, Symbol, SymbolAggregate};

/// Default ranked-list cap.
pub const DEFAULT_TOP_N: usize = 50;

pub struct RankingEngine;

impl RankingEngine {
    /// Rank candidates against an aggregate snapshot, truncated to `top_n`.
    ///
    /// Sort key: effective volume descending, then `quote.high - quote.low`
    /// descending. The sort is stable, so full ties preserve input order.
    pub fn rank(
        candidates: &[Candidate],
        snapshot: &HashMap<Symbol, SymbolAggregate>,
        top_n: usize,
    ) -> Vec<RankedEntry> {
        let mut entries: Vec<RankedEntry> = candidates
            .iter()
            .map(|candidate| Self::entry_for(candidate, snapshot))
            .collect();

        entries.sort_by(|a, b| {
            b.rank_score
                .total_cmp(&a.rank_score)
                .then(b.candidate.quote.daily_range().total_cmp(&a.candidate.quote.daily_range()))
        });

        entries.truncate(top_n);
        entries
    }

    /// Build one entry: live aggregate when present and non-empty,
    /// static quote volume otherwise (no live average-price substitute).
    fn entry_for(
        candidate: &Candidate,
        snapshot: &HashMap<Symbol, SymbolAggregate>,
    ) -> RankedEntry {
        let live = snapshot
            .get(&candidate.symbol)
            .filter(|agg| agg.tick_count > 0)
            .and_then(|agg| {
                agg.avg_price().map(|avg_price| LiveStats {
                    avg_price,
                    total_volume: agg.total_volume(),
                    tick_count: agg.tick_count,
                })
            });

        let rank_score = live
            .as_ref()
            .map(|l| l.total_volume)
            .unwrap_or(candidate.quote.volume);

        RankedEntry {
            candidate: candidate.clone(),
            live,
            rank_score,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
