// src/sources.rs
//! Static source catalog: the fixed set of endpoints the pipeline targets,
//! split into a high-reliability Tier-1 and a proxy-dependent Tier-2, plus the
//! hostname → display-name table.

use crate::ingest::types::ContentKind;

/// Sealed set of parser implementations a source can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserKind {
    Rss,
    Atom,
    /// Forum "hot posts" JSON (Reddit-shaped listing).
    ForumJson,
    /// Link-aggregator ID list + per-ID detail (Hacker News-shaped).
    AggregatorJson,
}

#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    pub name: &'static str,
    pub url: &'static str,
    pub host: &'static str,
    pub kind: ContentKind,
    pub parser: ParserKind,
    /// Identifying User-Agent required by some endpoints (e.g. the forum API).
    pub user_agent: Option<&'static str>,
}

pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

const FORUM_USER_AGENT: &str = "ai-news-digest/0.1 (content aggregation)";

/// High-reliability sources, fetched concurrently every run.
pub fn tier1() -> Vec<SourceDescriptor> {
    vec![
        SourceDescriptor {
            name: "OpenAI Blog",
            url: "https://openai.com/blog/rss.xml",
            host: "openai.com",
            kind: ContentKind::Blog,
            parser: ParserKind::Rss,
            user_agent: None,
        },
        SourceDescriptor {
            name: "Google AI Blog",
            url: "https://blog.google/technology/ai/rss/",
            host: "blog.google",
            kind: ContentKind::Blog,
            parser: ParserKind::Rss,
            user_agent: None,
        },
        SourceDescriptor {
            name: "Hugging Face Blog",
            url: "https://huggingface.co/blog/feed.xml",
            host: "huggingface.co",
            kind: ContentKind::Blog,
            parser: ParserKind::Rss,
            user_agent: None,
        },
        SourceDescriptor {
            name: "MIT Technology Review",
            url: "https://www.technologyreview.com/topic/artificial-intelligence/feed",
            host: "technologyreview.com",
            kind: ContentKind::Blog,
            parser: ParserKind::Rss,
            user_agent: None,
        },
        SourceDescriptor {
            name: "The Verge AI",
            url: "https://www.theverge.com/rss/ai-artificial-intelligence/index.xml",
            host: "theverge.com",
            kind: ContentKind::Blog,
            parser: ParserKind::Atom,
            user_agent: None,
        },
        SourceDescriptor {
            name: "Practical AI",
            url: "https://changelog.com/practicalai/feed",
            host: "changelog.com",
            kind: ContentKind::Audio,
            parser: ParserKind::Rss,
            user_agent: None,
        },
        SourceDescriptor {
            name: "Latent Space",
            url: "https://api.substack.com/feed/podcast/1084089.rss",
            host: "latent.space",
            kind: ContentKind::Audio,
            parser: ParserKind::Rss,
            user_agent: None,
        },
        SourceDescriptor {
            name: "Two Minute Papers",
            url: "https://www.youtube.com/feeds/videos.xml?channel_id=UCbfYPyITQ-7l4upoX8nvctg",
            host: "youtube.com",
            kind: ContentKind::Video,
            parser: ParserKind::Atom,
            user_agent: None,
        },
        SourceDescriptor {
            name: "Yannic Kilcher",
            url: "https://www.youtube.com/feeds/videos.xml?channel_id=UCZHmQk67mSJgfCCTn7xBfew",
            host: "youtube.com",
            kind: ContentKind::Video,
            parser: ParserKind::Atom,
            user_agent: None,
        },
        SourceDescriptor {
            name: "r/MachineLearning",
            url: "https://www.reddit.com/r/MachineLearning/hot.json?limit=25",
            host: "reddit.com",
            kind: ContentKind::Blog,
            parser: ParserKind::ForumJson,
            user_agent: Some(FORUM_USER_AGENT),
        },
        SourceDescriptor {
            name: "Hacker News",
            url: "https://hacker-news.firebaseio.com/v0/topstories.json",
            host: "news.ycombinator.com",
            kind: ContentKind::Blog,
            parser: ParserKind::AggregatorJson,
            user_agent: None,
        },
    ]
}

/// Proxy-dependent sources, fetched sequentially only when Tier-1 under-delivers.
pub fn tier2() -> Vec<SourceDescriptor> {
    vec![
        SourceDescriptor {
            name: "TechCrunch AI",
            url: "https://techcrunch.com/category/artificial-intelligence/feed/",
            host: "techcrunch.com",
            kind: ContentKind::Blog,
            parser: ParserKind::Rss,
            user_agent: Some(BROWSER_USER_AGENT),
        },
        SourceDescriptor {
            name: "VentureBeat AI",
            url: "https://venturebeat.com/category/ai/feed/",
            host: "venturebeat.com",
            kind: ContentKind::Blog,
            parser: ParserKind::Rss,
            user_agent: Some(BROWSER_USER_AGENT),
        },
        SourceDescriptor {
            name: "Ars Technica AI",
            url: "https://arstechnica.com/ai/feed/",
            host: "arstechnica.com",
            kind: ContentKind::Blog,
            parser: ParserKind::Rss,
            user_agent: Some(BROWSER_USER_AGENT),
        },
    ]
}

/// Resolve a hostname to its canonical display name; unknown hosts fall back
/// to the raw hostname.
pub fn display_name(host: &str) -> String {
    let h = host.trim_start_matches("www.").to_ascii_lowercase();
    let known: &[(&str, &str)] = &[
        ("openai.com", "OpenAI Blog"),
        ("blog.google", "Google AI Blog"),
        ("huggingface.co", "Hugging Face Blog"),
        ("technologyreview.com", "MIT Technology Review"),
        ("theverge.com", "The Verge AI"),
        ("changelog.com", "Practical AI"),
        ("latent.space", "Latent Space"),
        ("youtube.com", "YouTube"),
        ("reddit.com", "r/MachineLearning"),
        ("news.ycombinator.com", "Hacker News"),
        ("techcrunch.com", "TechCrunch AI"),
        ("venturebeat.com", "VentureBeat AI"),
        ("arstechnica.com", "Ars Technica AI"),
        ("anthropic.com", "Anthropic"),
        ("deepmind.google", "Google DeepMind"),
        ("ai.meta.com", "Meta AI"),
    ];
    for (k, v) in known {
        if h == *k {
            return (*v).to_string();
        }
    }
    h
}
