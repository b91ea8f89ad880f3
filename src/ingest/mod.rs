// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::config::PipelineConfig;
use crate::fetch::{fetch_with_strategies, FetchStrategy, Fetcher};
use crate::sources::{self, ParserKind, SourceDescriptor};
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use types::ContentItem;

/// One-time metrics registration.
pub fn describe_metrics() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("digest_items_total", "Items parsed from sources.");
        describe_counter!("digest_source_errors_total", "Source fetch/parse errors.");
        describe_counter!("digest_tier2_passes_total", "Runs that needed the Tier-2 pass.");
        describe_counter!("digest_filtered_total", "Items dropped by the quality filter.");
        describe_histogram!("digest_parse_ms", "Per-document parse time in milliseconds.");
    });
}

/// Strip markup tags, decode HTML entities, normalize whitespace.
pub fn sanitize_text(s: &str) -> String {
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    let stripped = re_tags.replace_all(s, " ");

    let decoded = html_escape::decode_html_entities(stripped.as_ref());

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    re_ws.replace_all(decoded.as_ref(), " ").trim().to_string()
}

/// Cap a description at 300 characters with an ellipsis marker.
pub fn truncate_description(s: &str) -> String {
    const MAX: usize = 300;
    if s.chars().count() <= MAX {
        return s.to_string();
    }
    let cut: String = s.chars().take(MAX - 3).collect();
    format!("{}...", cut.trim_end())
}

/// True when a timestamp is inside the recency window. Timestamp-less items
/// pass here and receive a neutral recency sub-score later.
pub fn within_recency_window(
    published_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    window_hours: i64,
) -> bool {
    match published_at {
        Some(ts) => now.signed_duration_since(ts).num_hours() < window_hours,
        None => true,
    }
}

async fn fetch_source(
    fetcher: &Fetcher,
    cfg: &PipelineConfig,
    desc: &SourceDescriptor,
    strategies: &[FetchStrategy],
    now: DateTime<Utc>,
) -> anyhow::Result<Vec<ContentItem>> {
    match desc.parser {
        ParserKind::Rss | ParserKind::Atom => {
            let body = if strategies.is_empty() {
                fetcher.get_text(desc.url, desc.user_agent).await?
            } else {
                fetch_with_strategies(fetcher, desc.url, strategies).await?
            };
            providers::feed::parse_feed(desc, &body, now, cfg.recency_window_hours)
        }
        ParserKind::ForumJson => {
            let body = fetcher.get_text(desc.url, desc.user_agent).await?;
            providers::forum::parse_hot_posts(desc, &body, now, cfg.recency_window_hours)
        }
        ParserKind::AggregatorJson => {
            providers::aggregator::fetch_top_stories(fetcher, cfg, desc, now).await
        }
    }
}

/// Fan-out/fan-in over a Tier-1 catalog. Every task settles before the
/// phase completes; a failing source is downgraded to zero items.
pub async fn run_tier1(
    fetcher: &Fetcher,
    cfg: &PipelineConfig,
    catalog: Vec<SourceDescriptor>,
    now: DateTime<Utc>,
) -> Vec<ContentItem> {
    describe_metrics();

    let mut set = tokio::task::JoinSet::new();
    for desc in catalog {
        let fetcher = fetcher.clone();
        let cfg = cfg.clone();
        set.spawn(async move {
            let items = match fetch_source(&fetcher, &cfg, &desc, &[], now).await {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(source = desc.name, error = %e, "tier-1 source failed");
                    counter!("digest_source_errors_total").increment(1);
                    Vec::new()
                }
            };
            (desc.name, items)
        });
    }

    // Join after completion; the final set is independent of finish order.
    let mut per_source: Vec<(&'static str, Vec<ContentItem>)> = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(pair) => per_source.push(pair),
            Err(e) => {
                tracing::warn!(error = %e, "tier-1 task panicked");
                counter!("digest_source_errors_total").increment(1);
            }
        }
    }
    per_source.sort_by_key(|(name, _)| *name);

    let mut items = Vec::new();
    for (name, mut v) in per_source {
        tracing::info!(source = name, count = v.len(), "tier-1 source done");
        items.append(&mut v);
    }
    counter!("digest_items_total").increment(items.len() as u64);
    items
}

/// Sequential Tier-2 pass with a fixed inter-request delay, stopping early
/// once the secondary sufficiency threshold is reached. Each source goes
/// through the ordered strategy list (proxy, then direct with a browser UA).
pub async fn run_tier2(
    fetcher: &Fetcher,
    cfg: &PipelineConfig,
    catalog: Vec<SourceDescriptor>,
    now: DateTime<Utc>,
) -> Vec<ContentItem> {
    describe_metrics();
    counter!("digest_tier2_passes_total").increment(1);

    let mut items = Vec::new();
    for (i, desc) in catalog.into_iter().enumerate() {
        if items.len() >= cfg.tier2_target {
            tracing::info!(count = items.len(), "tier-2 target reached, stopping early");
            break;
        }
        if i > 0 {
            tokio::time::sleep(cfg.tier2_delay).await;
        }

        let mut strategies = vec![FetchStrategy::Proxy {
            base: cfg.proxy_base.clone(),
        }];
        if let Some(ua) = desc.user_agent {
            strategies.push(FetchStrategy::Direct {
                user_agent: ua.to_string(),
            });
        }

        match fetch_source(fetcher, cfg, &desc, &strategies, now).await {
            Ok(mut v) => {
                tracing::info!(source = desc.name, count = v.len(), "tier-2 source done");
                counter!("digest_items_total").increment(v.len() as u64);
                items.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(source = desc.name, error = %e, "tier-2 source failed");
                counter!("digest_source_errors_total").increment(1);
            }
        }
    }
    items
}

/// Full fetch phase over the built-in catalog.
pub async fn collect_items(
    fetcher: &Fetcher,
    cfg: &PipelineConfig,
    now: DateTime<Utc>,
) -> Vec<ContentItem> {
    collect_from(fetcher, cfg, sources::tier1(), sources::tier2(), now).await
}

/// Tier-1 fan-out, then the Tier-2 pass only when the Tier-1 yield is below
/// the minimum threshold. Catalogs are parameters so tests can point them at
/// local endpoints.
pub async fn collect_from(
    fetcher: &Fetcher,
    cfg: &PipelineConfig,
    tier1: Vec<SourceDescriptor>,
    tier2: Vec<SourceDescriptor>,
    now: DateTime<Utc>,
) -> Vec<ContentItem> {
    let mut items = run_tier1(fetcher, cfg, tier1, now).await;
    if items.len() < cfg.min_tier1_items {
        tracing::info!(
            tier1 = items.len(),
            threshold = cfg.min_tier1_items,
            "tier-1 under-delivered, falling back to tier-2"
        );
        items.extend(run_tier2(fetcher, cfg, tier2, now).await);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn sanitize_strips_tags_and_decodes_entities() {
        let s = "<p>GPT-5 &amp; friends:&nbsp;a   <b>new</b> model</p>";
        assert_eq!(sanitize_text(s), "GPT-5 & friends: a new model");
    }

    #[test]
    fn sanitize_keeps_question_marks() {
        // Terminal punctuation matters for the engagement sub-score.
        assert_eq!(sanitize_text("How does it work?"), "How does it work?");
    }

    #[test]
    fn truncate_adds_ellipsis_past_300_chars() {
        let long = "x".repeat(400);
        let out = truncate_description(&long);
        assert!(out.chars().count() <= 300);
        assert!(out.ends_with("..."));

        let short = "short description";
        assert_eq!(truncate_description(short), short);
    }

    #[test]
    fn recency_window_excludes_old_and_keeps_unstamped() {
        let now = Utc::now();
        let fresh = Some(now - ChronoDuration::hours(2));
        let stale = Some(now - ChronoDuration::hours(100));
        assert!(within_recency_window(fresh, now, 72));
        assert!(!within_recency_window(stale, now, 72));
        assert!(within_recency_window(None, now, 72));
    }
}
