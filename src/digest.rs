// src/digest.rs
//! Categorizer, selector and digest envelope. Ranked items are placed into
//! capacity-bounded categories in score order; empty categories receive one
//! clearly-labeled placeholder so the digest always has non-empty sections.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::ingest::types::{ContentItem, ContentKind, Impact, PLACEHOLDER_URL};

pub const VIDEO_CAP: usize = 4;
pub const AUDIO_CAP: usize = 4;
pub const BLOG_CAP: usize = 8;
pub const TOP_STORIES: usize = 3;

pub const MORNING_BADGE: &str = "Morning Digest";
pub const EVENING_BADGE: &str = "Evening Digest";
pub const FALLBACK_BADGE: &str = "Fallback Digest";

/// Seedable LCG for placeholder fixture content; keeps digests reproducible
/// under a fixed seed instead of ad hoc randomness.
#[derive(Debug, Clone)]
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_range(&mut self, lo: u64, hi: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        lo + (self.0 >> 33) % (hi - lo).max(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestContent {
    pub blog: Vec<ContentItem>,
    pub audio: Vec<ContentItem>,
    pub video: Vec<ContentItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopStory {
    pub title: String,
    pub source: String,
    #[serde(rename = "significanceScore")]
    pub significance_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestMetadata {
    #[serde(rename = "totalItems")]
    pub total_items: usize,
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
    #[serde(rename = "sourceCount")]
    pub source_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Digest {
    pub summary: String,
    pub content: DigestContent,
    #[serde(rename = "topStories")]
    pub top_stories: Vec<TopStory>,
    pub metadata: DigestMetadata,
    pub timestamp: DateTime<Utc>,
    pub badge: String,
}

fn cap_for(kind: ContentKind) -> usize {
    match kind {
        ContentKind::Video => VIDEO_CAP,
        ContentKind::Audio => AUDIO_CAP,
        ContentKind::Blog => BLOG_CAP,
    }
}

/// Greedy single pass over score-descending items: place into the declared
/// category until its cap is reached, drop the rest. The capacity check runs
/// strictly in score order, so highest scores win by construction and placed
/// items are never evicted.
pub fn categorize(ranked: Vec<ContentItem>, rng: &mut Lcg) -> DigestContent {
    let mut content = DigestContent {
        blog: Vec::with_capacity(BLOG_CAP),
        audio: Vec::with_capacity(AUDIO_CAP),
        video: Vec::with_capacity(VIDEO_CAP),
    };

    for item in ranked {
        let bucket = match item.kind {
            ContentKind::Blog => &mut content.blog,
            ContentKind::Audio => &mut content.audio,
            ContentKind::Video => &mut content.video,
        };
        if bucket.len() < cap_for(item.kind) {
            bucket.push(item);
        }
    }

    if content.blog.is_empty() {
        content.blog.push(placeholder(ContentKind::Blog, rng));
    }
    if content.audio.is_empty() {
        content.audio.push(placeholder(ContentKind::Audio, rng));
    }
    if content.video.is_empty() {
        content.video.push(placeholder(ContentKind::Video, rng));
    }

    content
}

/// Fixed, clearly-labeled stand-in for an empty category.
pub fn placeholder(kind: ContentKind, rng: &mut Lcg) -> ContentItem {
    let (title, description) = match kind {
        ContentKind::Blog => (
            "No fresh AI articles right now",
            "No qualifying articles made it through this run. Check back with the next digest for new reporting and research posts.",
        ),
        ContentKind::Audio => (
            "No fresh AI podcasts right now",
            "No qualifying podcast episodes made it through this run. Check back with the next digest for new episodes.",
        ),
        ContentKind::Video => (
            "No fresh AI videos right now",
            "No qualifying videos made it through this run. Check back with the next digest for new uploads and talks.",
        ),
    };

    let mut item = ContentItem::new(
        title.to_string(),
        description.to_string(),
        None,
        "AI News Digest".to_string(),
        String::new(),
        None,
        kind,
    );
    item.significance_score = Some(0.0);
    item.impact = Some(Impact::Low);
    match kind {
        ContentKind::Blog => item.read_time = Some(format!("{} min read", rng.next_range(2, 6))),
        ContentKind::Audio => item.duration = Some(format!("{} min", rng.next_range(20, 60))),
        ContentKind::Video => item.duration = Some(format!("{} min", rng.next_range(5, 30))),
    }
    item
}

/// The 3 globally highest-scoring placed items, score-descending.
pub fn top_stories(content: &DigestContent) -> Vec<TopStory> {
    let mut all: Vec<&ContentItem> = content
        .blog
        .iter()
        .chain(content.audio.iter())
        .chain(content.video.iter())
        .filter(|i| i.url != PLACEHOLDER_URL || i.significance_score.unwrap_or(0.0) > 0.0)
        .collect();
    all.sort_by(|a, b| {
        b.significance_score
            .partial_cmp(&a.significance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    all.into_iter()
        .take(TOP_STORIES)
        .map(|i| TopStory {
            title: i.title.clone(),
            source: i.source.clone(),
            significance_score: i.significance_score.unwrap_or(0.0),
        })
        .collect()
}

/// Badge derived purely from the hour of day.
pub fn badge_for(now: DateTime<Utc>) -> &'static str {
    if now.hour() < 14 {
        MORNING_BADGE
    } else {
        EVENING_BADGE
    }
}

pub fn assemble(
    content: DigestContent,
    top_stories: Vec<TopStory>,
    summary: String,
    source_count: usize,
    now: DateTime<Utc>,
) -> Digest {
    let total_items = content.blog.len() + content.audio.len() + content.video.len();
    Digest {
        summary,
        content,
        top_stories,
        metadata: DigestMetadata {
            total_items,
            generated_at: now,
            source_count,
        },
        timestamp: now,
        badge: badge_for(now).to_string(),
    }
}

/// Static digest returned when the whole pipeline fails: one placeholder blog
/// item, empty audio/video, a fixed badge. Never propagates the error.
pub fn fallback_digest(now: DateTime<Utc>) -> Digest {
    let mut item = ContentItem::new(
        "AI News Digest is temporarily unavailable".to_string(),
        "The aggregation pipeline hit an unexpected error. A fresh digest will be generated on the next run.".to_string(),
        None,
        "AI News Digest".to_string(),
        String::new(),
        None,
        ContentKind::Blog,
    );
    item.significance_score = Some(0.0);
    item.impact = Some(Impact::Low);

    Digest {
        summary: "The digest could not be generated this run. Please try again shortly."
            .to_string(),
        content: DigestContent {
            blog: vec![item],
            audio: Vec::new(),
            video: Vec::new(),
        },
        top_stories: Vec::new(),
        metadata: DigestMetadata {
            total_items: 1,
            generated_at: now,
            source_count: 0,
        },
        timestamp: now,
        badge: FALLBACK_BADGE.to_string(),
    }
}
