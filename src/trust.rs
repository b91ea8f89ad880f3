// src/trust.rs
//! # Source Trust
//!
//! Configurable mapping from origin hostnames to trust scores in the range
//! `[3.0, 10.0]`.
//!
//! - Loads from JSON config (trust values + flagship host list).
//! - Case-insensitive lookup with `www.` stripping.
//! - Fallback order: exact match → suffix match → default.
//! - Flagship AI-lab hosts receive a +2 bonus, capped at 10.
//! - Includes a built-in `default_seed()` with the catalog hosts.

use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

/// Configuration for source trust, loaded from JSON or defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceTrustConfig {
    /// Trust used when no match is found.
    #[serde(default = "default_trust")]
    pub default_trust: f64,
    /// Explicit trust values for canonical hostnames.
    #[serde(default)]
    pub trust: HashMap<String, f64>,
    /// Hosts of flagship AI labs; these get the +2 bonus.
    #[serde(default)]
    pub flagship: Vec<String>,
}

fn default_trust() -> f64 {
    3.0
}

pub const FLAGSHIP_BONUS: f64 = 2.0;
pub const TRUST_CAP: f64 = 10.0;

impl SourceTrustConfig {
    /// Load configuration from a JSON file.
    /// Falls back to `default_seed()` on error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|_| Self::default_seed()),
            Err(_) => Self::default_seed(),
        }
    }

    /// Trust score for a hostname.
    ///
    /// Steps:
    /// 1. Exact match on the normalized host.
    /// 2. Suffix match (e.g. "research.openai.com" → "openai.com").
    /// 3. Default trust.
    ///
    /// A flagship host then gets `+2`, capped at 10.
    pub fn trust_for(&self, host: &str) -> f64 {
        let h = normalize_host(host);

        let mut base = self.default_trust;
        if let Some(&t) = self.trust.get(&h) {
            base = t;
        } else if let Some((_, &t)) = self
            .trust
            .iter()
            .find(|(k, _)| h.ends_with(&format!(".{k}")))
        {
            base = t;
        }

        if self.is_flagship(&h) {
            base = (base + FLAGSHIP_BONUS).min(TRUST_CAP);
        }
        base.clamp(0.0, TRUST_CAP)
    }

    fn is_flagship(&self, normalized_host: &str) -> bool {
        self.flagship.iter().any(|f| {
            let f = normalize_host(f);
            normalized_host == f || normalized_host.ends_with(&format!(".{f}"))
        })
    }

    /// Built-in seed covering the source catalog. Used as fallback if no
    /// config file is found.
    pub fn default_seed() -> Self {
        let mut trust = HashMap::new();
        for (k, v) in [
            ("openai.com", 8.0),
            ("anthropic.com", 8.0),
            ("deepmind.google", 8.0),
            ("ai.meta.com", 8.0),
            ("blog.google", 9.0),
            ("huggingface.co", 8.0),
            ("technologyreview.com", 9.0),
            ("arxiv.org", 8.0),
            ("theverge.com", 7.0),
            ("techcrunch.com", 7.0),
            ("arstechnica.com", 7.0),
            ("venturebeat.com", 6.0),
            ("changelog.com", 6.0),
            ("latent.space", 6.0),
            ("youtube.com", 5.0),
            ("news.ycombinator.com", 6.0),
            ("reddit.com", 5.0),
        ] {
            trust.insert(k.to_string(), v);
        }

        Self {
            default_trust: 3.0,
            trust,
            flagship: vec![
                "openai.com".to_string(),
                "anthropic.com".to_string(),
                "deepmind.google".to_string(),
                "ai.meta.com".to_string(),
            ],
        }
    }
}

/// Lowercase and strip a leading `www.`.
fn normalize_host(host: &str) -> String {
    host.trim()
        .to_ascii_lowercase()
        .trim_start_matches("www.")
        .to_string()
}
