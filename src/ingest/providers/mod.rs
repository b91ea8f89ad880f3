// src/ingest/providers/mod.rs
pub mod aggregator;
pub mod feed;
pub mod forum;
