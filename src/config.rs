// src/config.rs
//! Explicit pipeline configuration. Built once in the binary (env + .env via
//! `dotenvy`) and passed into the pipeline constructor, so tests can run with
//! `Default` and a mocked-absent summarizer instead of ad hoc env reads.

use std::time::Duration;

/// Which summarization collaborator the digest assembler talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryProvider {
    /// No collaborator configured; the deterministic local fallback is used.
    Disabled,
    /// OpenAI chat completions.
    OpenAi { api_key: String, model: String },
    /// Fixed response for tests.
    Mock { text: String },
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Per-attempt HTTP timeout for source fetches.
    pub request_timeout: Duration,
    /// Maximum fetch attempts per endpoint (>= 1).
    pub retry_attempts: u32,
    /// Tier-1 yield below this triggers the Tier-2 pass.
    pub min_tier1_items: usize,
    /// Tier-2 stops early once it has contributed this many items.
    pub tier2_target: usize,
    /// Delay between sequential Tier-2 source fetches.
    pub tier2_delay: Duration,
    /// Delay between per-ID detail fetches on the link aggregator.
    pub detail_delay: Duration,
    /// How many aggregator story IDs to resolve per run.
    pub max_aggregator_ids: usize,
    /// Items older than this (from pipeline start) are excluded at parse time.
    pub recency_window_hours: i64,
    /// Pass-through proxy used as the first Tier-2 retrieval strategy.
    pub proxy_base: String,
    /// Seed for the placeholder-content generator (reproducible fixtures).
    pub placeholder_seed: u64,
    pub summary: SummaryProvider,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            retry_attempts: 2,
            min_tier1_items: 15,
            tier2_target: 10,
            tier2_delay: Duration::from_millis(2000),
            detail_delay: Duration::from_millis(250),
            max_aggregator_ids: 20,
            recency_window_hours: 72,
            proxy_base: "https://api.allorigins.win/raw".to_string(),
            placeholder_seed: 0x41_49_4e_45_57_53, // stable default
            summary: SummaryProvider::Disabled,
        }
    }
}

impl PipelineConfig {
    /// Build from the environment. `OPENAI_API_KEY` enables the collaborator;
    /// everything else has sane defaults overridable via `DIGEST_*` vars.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Some(secs) = parse_env::<u64>("DIGEST_REQUEST_TIMEOUT_SECS") {
            cfg.request_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = parse_env::<u32>("DIGEST_RETRY_ATTEMPTS") {
            cfg.retry_attempts = n.max(1);
        }
        if let Some(n) = parse_env::<usize>("DIGEST_MIN_TIER1_ITEMS") {
            cfg.min_tier1_items = n;
        }
        if let Some(n) = parse_env::<usize>("DIGEST_TIER2_TARGET") {
            cfg.tier2_target = n;
        }
        if let Some(ms) = parse_env::<u64>("DIGEST_TIER2_DELAY_MS") {
            cfg.tier2_delay = Duration::from_millis(ms);
        }
        if let Some(h) = parse_env::<i64>("DIGEST_RECENCY_WINDOW_HOURS") {
            cfg.recency_window_hours = h.max(1);
        }
        if let Ok(base) = std::env::var("DIGEST_PROXY_BASE") {
            if !base.trim().is_empty() {
                cfg.proxy_base = base;
            }
        }
        if let Some(seed) = parse_env::<u64>("DIGEST_PLACEHOLDER_SEED") {
            cfg.placeholder_seed = seed;
        }

        cfg.summary = match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => SummaryProvider::OpenAi {
                api_key: key,
                model: std::env::var("DIGEST_SUMMARY_MODEL")
                    .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            },
            _ => SummaryProvider::Disabled,
        };

        cfg
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_matches_pipeline_contract() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.retry_attempts, 2);
        assert_eq!(cfg.min_tier1_items, 15);
        assert_eq!(cfg.tier2_target, 10);
        assert_eq!(cfg.tier2_delay, Duration::from_millis(2000));
        assert_eq!(cfg.recency_window_hours, 72);
        assert_eq!(cfg.summary, SummaryProvider::Disabled);
    }

    #[test]
    #[serial]
    fn env_overrides_apply() {
        std::env::set_var("DIGEST_MIN_TIER1_ITEMS", "7");
        std::env::set_var("DIGEST_TIER2_DELAY_MS", "50");
        std::env::remove_var("OPENAI_API_KEY");

        let cfg = PipelineConfig::from_env();
        assert_eq!(cfg.min_tier1_items, 7);
        assert_eq!(cfg.tier2_delay, Duration::from_millis(50));
        assert_eq!(cfg.summary, SummaryProvider::Disabled);

        std::env::remove_var("DIGEST_MIN_TIER1_ITEMS");
        std::env::remove_var("DIGEST_TIER2_DELAY_MS");
    }

    #[test]
    #[serial]
    fn api_key_enables_openai_summary() {
        std::env::set_var("OPENAI_API_KEY", "sk-test");
        let cfg = PipelineConfig::from_env();
        match cfg.summary {
            SummaryProvider::OpenAi { ref model, .. } => assert_eq!(model, "gpt-4o-mini"),
            other => panic!("expected OpenAi provider, got {other:?}"),
        }
        std::env::remove_var("OPENAI_API_KEY");
    }
}
