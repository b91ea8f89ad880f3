// src/ingest/providers/aggregator.rs
//! Link-aggregator parser (Hacker News-shaped API): a top-story ID list, then
//! one throttled detail fetch per ID. Detail failures are skipped, not fatal.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::config::PipelineConfig;
use crate::fetch::Fetcher;
use crate::ingest::types::ContentItem;
use crate::ingest::{sanitize_text, within_recency_window};
use crate::rank::keywords::matches_ai_topic;
use crate::sources::{display_name, SourceDescriptor};

const ITEM_ENDPOINT: &str = "https://hacker-news.firebaseio.com/v0/item";

#[derive(Debug, Deserialize)]
struct Story {
    title: Option<String>,
    url: Option<String>,
    #[serde(default)]
    score: u32,
    #[serde(default)]
    descendants: u32,
    time: Option<i64>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

pub async fn fetch_top_stories(
    fetcher: &Fetcher,
    cfg: &PipelineConfig,
    desc: &SourceDescriptor,
    now: DateTime<Utc>,
) -> Result<Vec<ContentItem>> {
    let body = fetcher.get_text(desc.url, desc.user_agent).await?;
    let ids: Vec<u64> =
        serde_json::from_str(&body).with_context(|| format!("parsing {} id list", desc.name))?;

    let mut out = Vec::new();
    for (i, id) in ids.into_iter().take(cfg.max_aggregator_ids).enumerate() {
        if i > 0 {
            tokio::time::sleep(cfg.detail_delay).await;
        }
        match fetch_story(fetcher, id).await {
            Ok(Some(item)) => {
                if let Some(item) = normalize_story(desc, item, now, cfg.recency_window_hours) {
                    out.push(item);
                }
            }
            Ok(None) => {}
            Err(e) => {
                // One missing story never fails the whole source.
                tracing::warn!(source = desc.name, id, error = %e, "story detail fetch failed");
            }
        }
    }
    Ok(out)
}

async fn fetch_story(fetcher: &Fetcher, id: u64) -> Result<Option<Story>> {
    let url = format!("{ITEM_ENDPOINT}/{id}.json");
    let body = fetcher.get_text(&url, None).await?;
    // Deleted items come back as literal `null`.
    let story: Option<Story> =
        serde_json::from_str(&body).with_context(|| format!("parsing story {id}"))?;
    Ok(story)
}

fn normalize_story(
    desc: &SourceDescriptor,
    story: Story,
    now: DateTime<Utc>,
    window_hours: i64,
) -> Option<ContentItem> {
    if story.kind.as_deref() != Some("story") {
        return None;
    }
    let title = sanitize_text(story.title.as_deref().unwrap_or_default());
    if title.is_empty() || !matches_ai_topic(&title) {
        return None;
    }

    let published_at = story
        .time
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single());
    if !within_recency_window(published_at, now, window_hours) {
        return None;
    }

    // Stories carry no body; synthesize a deterministic description.
    let description = format!(
        "Front-page story on Hacker News with {} points and {} comments.",
        story.score, story.descendants
    );

    // Aggregator links point at arbitrary hosts; resolve the source label
    // from the link host, falling back to the aggregator itself.
    let link_host = story
        .url
        .as_deref()
        .and_then(|u| reqwest::Url::parse(u).ok())
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()));
    let (source, host) = match link_host {
        Some(h) => (display_name(&h), h),
        None => (desc.name.to_string(), desc.host.to_string()),
    };

    let mut item = ContentItem::new(
        title,
        description,
        story.url,
        source,
        host,
        published_at,
        desc.kind,
    );
    item.engagement = Some(story.score.saturating_add(story.descendants));
    Some(item)
}
