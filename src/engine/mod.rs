//! Core engine — candidate discovery and ranking.
//!
//! `screener` turns the full catalog into a bounded, news-bearing
//! candidate set; `ranker` merges that set with the live aggregate
//! snapshot into a stable top-N ordering.

pub mod ranker;
pub mod screener;
