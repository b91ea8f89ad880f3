// src/ingest/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content category a source (and its items) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Blog,
    Audio,
    Video,
}

/// Coarse impact tier derived from the significance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

/// One normalized item flowing through the pipeline. Created by a parser,
/// possibly dropped by the quality filter, scored by the ranking engine,
/// then placed into exactly one digest category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub title: String,
    pub description: String,
    pub url: String,
    /// Canonical display name of the origin (resolved from the hostname table).
    pub source: String,
    /// Origin hostname, kept for trust lookup; not part of the wire format.
    #[serde(skip_serializing, default)]
    pub host: String,
    #[serde(rename = "publishedAt", skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    #[serde(rename = "significanceScore", skip_serializing_if = "Option::is_none")]
    pub significance_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<Impact>,
    /// Relative age label ("3h ago"), filled during enrichment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Upvote/comment count for API-style sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engagement: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(rename = "readTime", skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
}

/// Placeholder link used when a source item carries no URL.
pub const PLACEHOLDER_URL: &str = "#";

impl ContentItem {
    /// Bare item as parsers produce it; scoring and enrichment fields are
    /// filled later by the ranking engine.
    pub fn new(
        title: String,
        description: String,
        url: Option<String>,
        source: String,
        host: String,
        published_at: Option<DateTime<Utc>>,
        kind: ContentKind,
    ) -> Self {
        Self {
            title,
            description,
            url: url.unwrap_or_else(|| PLACEHOLDER_URL.to_string()),
            source,
            host,
            published_at,
            kind,
            significance_score: None,
            impact: None,
            time: None,
            engagement: None,
            duration: None,
            read_time: None,
        }
    }
}
