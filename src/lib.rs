//! PENNYSCOUT — Penny-Stock Screening & Sentiment Agent
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod market;
pub mod news;
pub mod sentiment;
pub mod stream;
pub mod engine;
pub mod llm;
