// src/rank/mod.rs
//! Significance ranking engine: deterministic weighted scoring in [0, 10]
//! from five sub-scores (source trust, keyword salience, recency, engagement,
//! novelty). Scoring is a pure function of item content, timestamps and the
//! fixed tables, so re-scoring identical input yields identical output.

pub mod keywords;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::ingest::types::{ContentItem, ContentKind, Impact};
use crate::trust::SourceTrustConfig;
use keywords::{term_matcher, KeywordConfig};

/// Canonical weight set (the weighted 5-factor scheme; see DESIGN.md).
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub trust: f64,
    pub salience: f64,
    pub recency: f64,
    pub engagement: f64,
    pub novelty: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            trust: 0.25,
            salience: 0.30,
            recency: 0.20,
            engagement: 0.15,
            novelty: 0.10,
        }
    }
}

pub struct ScoringEngine {
    weights: ScoringWeights,
    trust: SourceTrustConfig,
    /// Compiled (matcher, weight) pairs from the salience table.
    salience: Vec<(Regex, f64)>,
    novelty_phrases: Vec<Regex>,
    routine_terms: Vec<Regex>,
    now: DateTime<Utc>,
}

fn superlative_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:first|new|breakthrough|revolutionary)\b").unwrap())
}

fn how_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bhow\b").unwrap())
}

impl ScoringEngine {
    pub fn new(trust: SourceTrustConfig, tables: &KeywordConfig, now: DateTime<Utc>) -> Self {
        let mut salience = Vec::with_capacity(tables.salience.len());
        for (term, weight) in &tables.salience {
            if let Some(re) = term_matcher(std::slice::from_ref(term)) {
                salience.push((re, *weight));
            }
        }
        // Stable iteration order for reproducible diagnostics.
        salience.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));

        let compile = |terms: &[String]| {
            terms
                .iter()
                .filter_map(|t| term_matcher(std::slice::from_ref(t)))
                .collect::<Vec<_>>()
        };

        Self {
            weights: ScoringWeights::default(),
            trust,
            salience,
            novelty_phrases: compile(&tables.novelty.phrases),
            routine_terms: compile(&tables.novelty.routine),
            now,
        }
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Final significance score in [0, 10], rounded to one decimal.
    pub fn score(&self, item: &ContentItem) -> f64 {
        let text = format!("{} {}", item.title, item.description);
        let weighted = self.weights.trust * self.trust_score(&item.host)
            + self.weights.salience * self.salience_score(&text)
            + self.weights.recency * self.recency_score(item.published_at)
            + self.weights.engagement * self.engagement_score(&item.title)
            + self.weights.novelty * self.novelty_score(&text);
        ((weighted.clamp(0.0, 10.0)) * 10.0).round() / 10.0
    }

    fn trust_score(&self, host: &str) -> f64 {
        self.trust.trust_for(host)
    }

    /// Sum of matched keyword weights with a multiplicative boost past 2 and
    /// past 4 distinct matches, capped at 10.
    fn salience_score(&self, text: &str) -> f64 {
        let mut sum = 0.0;
        let mut distinct = 0u32;
        for (re, weight) in &self.salience {
            if re.is_match(text) {
                sum += weight;
                distinct += 1;
            }
        }
        if distinct > 4 {
            sum *= 1.4;
        } else if distinct > 2 {
            sum *= 1.2;
        }
        sum.min(10.0)
    }

    /// Stepped recency. A missing timestamp gets the neutral mid-range score
    /// instead of defaulting to "now" (see DESIGN.md).
    fn recency_score(&self, published_at: Option<DateTime<Utc>>) -> f64 {
        let Some(ts) = published_at else {
            return 5.0;
        };
        let hours = self.now.signed_duration_since(ts).num_minutes() as f64 / 60.0;
        match hours {
            h if h < 1.0 => 10.0,
            h if h < 3.0 => 9.0,
            h if h < 6.0 => 8.0,
            h if h < 12.0 => 7.0,
            h if h < 24.0 => 6.0,
            h if h < 48.0 => 4.0,
            _ => 2.0,
        }
    }

    fn engagement_score(&self, title: &str) -> f64 {
        let mut score: f64 = 5.0;
        if superlative_re().is_match(title) {
            score += 2.0;
        }
        if title.trim_end().ends_with('?') || how_re().is_match(title) {
            score += 1.0;
        }
        if title.chars().any(|c| c.is_ascii_digit()) {
            score += 1.0;
        }
        score.min(10.0)
    }

    fn novelty_score(&self, text: &str) -> f64 {
        let mut score: f64 = 5.0;
        for re in &self.novelty_phrases {
            if re.is_match(text) {
                score += 1.0;
            }
        }
        for re in &self.routine_terms {
            if re.is_match(text) {
                score -= 0.5;
            }
        }
        score.clamp(1.0, 10.0)
    }

    /// Score and enrich every item, then stable-sort descending so ties keep
    /// their original encounter order.
    pub fn rank(&self, items: Vec<ContentItem>) -> Vec<ContentItem> {
        let mut ranked: Vec<ContentItem> = items
            .into_iter()
            .map(|mut item| {
                let score = self.score(&item);
                item.significance_score = Some(score);
                item.impact = Some(impact_for(score));
                item.time = item.published_at.map(|ts| relative_age(self.now, ts));
                if item.kind == ContentKind::Blog && item.read_time.is_none() {
                    item.read_time = Some(read_time_label(&item.description));
                }
                item
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.significance_score
                .partial_cmp(&a.significance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }
}

/// Impact tier boundaries: >= 8 high, >= 6 medium, else low.
pub fn impact_for(score: f64) -> Impact {
    if score >= 8.0 {
        Impact::High
    } else if score >= 6.0 {
        Impact::Medium
    } else {
        Impact::Low
    }
}

/// Human-readable age label for the digest UI.
pub fn relative_age(now: DateTime<Utc>, ts: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(ts);
    let minutes = delta.num_minutes();
    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if delta.num_hours() < 24 {
        format!("{}h ago", delta.num_hours())
    } else {
        format!("{}d ago", delta.num_days())
    }
}

/// Reading time from word count at ~200 wpm, floored at one minute.
pub fn read_time_label(text: &str) -> String {
    let words = text.split_whitespace().count();
    let minutes = (words as f64 / 200.0).ceil().max(1.0) as u64;
    format!("{minutes} min read")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use keywords::KeywordConfig;

    fn engine(now: DateTime<Utc>) -> ScoringEngine {
        ScoringEngine::new(
            SourceTrustConfig::default_seed(),
            &KeywordConfig::builtin(),
            now,
        )
    }

    fn item(title: &str, desc: &str, host: &str, published: Option<DateTime<Utc>>) -> ContentItem {
        ContentItem::new(
            title.to_string(),
            desc.to_string(),
            Some("https://example.com/x".to_string()),
            "Test".to_string(),
            host.to_string(),
            published,
            ContentKind::Blog,
        )
    }

    #[test]
    fn flagship_breakthrough_scores_high() {
        let now = Utc::now();
        let e = engine(now);
        let it = item(
            "OpenAI Announces Breakthrough GPT-5 Model",
            "A major step forward in frontier model reasoning and capability.",
            "openai.com",
            Some(now - ChronoDuration::minutes(30)),
        );
        let score = e.score(&it);
        assert!(score >= 8.0, "expected high significance, got {score}");
        assert_eq!(impact_for(score), Impact::High);
    }

    #[test]
    fn scoring_is_deterministic() {
        let now = Utc::now();
        let e = engine(now);
        let it = item(
            "Claude ships a new reasoning benchmark",
            "Benchmark results across several multimodal tasks and baselines.",
            "anthropic.com",
            Some(now - ChronoDuration::hours(5)),
        );
        assert_eq!(e.score(&it), e.score(&it));
    }

    #[test]
    fn scores_stay_inside_bounds() {
        let now = Utc::now();
        let e = engine(now);
        let hot = item(
            "First new revolutionary breakthrough: GPT-5 AGI milestone, unprecedented, pioneering",
            "breakthrough agi gpt-5 openai anthropic deepmind gemini claude llama transformer funding",
            "openai.com",
            Some(now),
        );
        let cold = item(
            "weekly maintenance notes",
            "minor patch update and routine maintenance changelog entries only",
            "nowhere.example",
            Some(now - ChronoDuration::hours(70)),
        );
        for it in [&hot, &cold] {
            let s = e.score(it);
            assert!((0.0..=10.0).contains(&s), "score out of range: {s}");
        }
        assert!(e.score(&hot) > e.score(&cold));
    }

    #[test]
    fn recency_steps_match_contract() {
        let now = Utc::now();
        let e = engine(now);
        let cases = [
            (30i64, 10.0),
            (120, 9.0),
            (5 * 60, 8.0),
            (11 * 60, 7.0),
            (23 * 60, 6.0),
            (40 * 60, 4.0),
            (80 * 60, 2.0),
        ];
        for (minutes_ago, expected) in cases {
            let got = e.recency_score(Some(now - ChronoDuration::minutes(minutes_ago)));
            assert_eq!(got, expected, "at {minutes_ago} minutes");
        }
        assert_eq!(e.recency_score(None), 5.0);
    }

    #[test]
    fn engagement_reads_title_signals() {
        let now = Utc::now();
        let e = engine(now);
        assert_eq!(e.engagement_score("Quiet release notes"), 5.0);
        assert_eq!(e.engagement_score("A new model appears"), 7.0);
        assert_eq!(e.engagement_score("How does the new GPT-4 work?"), 9.0);
    }

    #[test]
    fn novelty_clamps_to_lower_bound() {
        let now = Utc::now();
        let e = engine(now);
        let routine =
            "patch minor update hotfix maintenance changelog patch minor update maintenance";
        assert!(e.novelty_score(routine) >= 1.0);
    }

    #[test]
    fn rank_is_descending_and_stable_on_ties() {
        let now = Utc::now();
        let e = engine(now);
        let a = item("Alpha plain item one", "identical description text for tie", "x.example", None);
        let b = item("Alpha plain item two", "identical description text for tie", "x.example", None);
        let ranked = e.rank(vec![a.clone(), b.clone()]);
        // Same content score; encounter order preserved.
        assert_eq!(ranked[0].title, a.title);
        assert_eq!(ranked[1].title, b.title);
        let scores: Vec<f64> = ranked
            .iter()
            .map(|i| i.significance_score.unwrap())
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn read_time_floors_at_one_minute() {
        assert_eq!(read_time_label("a few words"), "1 min read");
    }
}
