// src/rank/keywords.rs
//! Keyword tables (salience weights, novelty phrases, topical vocabulary)
//! loaded from TOML. A built-in copy of `config/keywords.toml` is embedded so
//! the pipeline never runs without tables.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

const BUILTIN_TOML: &str = include_str!("../../config/keywords.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordConfig {
    pub salience: HashMap<String, f64>,
    pub novelty: NoveltySection,
    pub topics: TopicsSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoveltySection {
    pub phrases: Vec<String>,
    pub routine: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicsSection {
    pub vocabulary: Vec<String>,
}

impl KeywordConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing keyword config")
    }

    pub fn builtin() -> Self {
        // The embedded table is validated by tests; a broken edit fails there.
        Self::from_toml_str(BUILTIN_TOML).expect("embedded keywords.toml is valid")
    }
}

/// Shared table instance. Tests construct their own `KeywordConfig` when they
/// need a custom vocabulary.
pub fn keywords() -> &'static KeywordConfig {
    static CFG: OnceCell<KeywordConfig> = OnceCell::new();
    CFG.get_or_init(KeywordConfig::builtin)
}

/// Case-insensitive whole-word matcher for a term list. Word boundaries keep
/// short terms like "ai" from firing inside unrelated words.
pub fn term_matcher(terms: &[String]) -> Option<Regex> {
    if terms.is_empty() {
        return None;
    }
    let alternation = terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).ok()
}

fn topic_regex() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        term_matcher(&keywords().topics.vocabulary).expect("topic vocabulary is non-empty")
    })
}

/// Topical filter used by the API-style parsers.
pub fn matches_ai_topic(title: &str) -> bool {
    topic_regex().is_match(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_parse_and_are_in_range() {
        let cfg = KeywordConfig::builtin();
        assert!(!cfg.salience.is_empty());
        assert!(cfg.salience.values().all(|w| (4.0..=10.0).contains(w)));
        assert!(!cfg.novelty.phrases.is_empty());
        assert!(!cfg.topics.vocabulary.is_empty());
    }

    #[test]
    fn topical_filter_is_case_insensitive() {
        assert!(matches_ai_topic("OpenAI Announces Breakthrough GPT-5 Model"));
        assert!(matches_ai_topic("new MACHINE LEARNING course"));
        assert!(matches_ai_topic("Why AI agents fail"));
    }

    #[test]
    fn short_terms_do_not_fire_inside_words() {
        assert!(!matches_ai_topic("My favorite hiking trails this summer"));
        assert!(!matches_ai_topic("Repainting the kitchen"));
    }
}
