// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod config;
pub mod digest;
pub mod fetch;
pub mod filter;
pub mod ingest;
pub mod pipeline;
pub mod rank;
pub mod sources;
pub mod summary;
pub mod trust;

// ---- Re-exports for stable public API ----
pub use crate::config::{PipelineConfig, SummaryProvider};
pub use crate::digest::{Digest, DigestContent, TopStory};
pub use crate::ingest::types::{ContentItem, ContentKind, Impact};
pub use crate::pipeline::DigestPipeline;
