// src/ingest/providers/forum.rs
//! Forum "hot posts" parser (Reddit-shaped listing JSON). Applies the AI/ML
//! topical filter on titles; engagement is upvotes + comments.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::ingest::types::ContentItem;
use crate::ingest::{sanitize_text, truncate_description, within_recency_window};
use crate::rank::keywords::matches_ai_topic;
use crate::sources::SourceDescriptor;

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: Option<String>,
    #[serde(default)]
    selftext: String,
    permalink: Option<String>,
    url: Option<String>,
    created_utc: Option<f64>,
    #[serde(default)]
    ups: u32,
    #[serde(default)]
    num_comments: u32,
    #[serde(default)]
    stickied: bool,
}

pub fn parse_hot_posts(
    desc: &SourceDescriptor,
    body: &str,
    now: DateTime<Utc>,
    window_hours: i64,
) -> Result<Vec<ContentItem>> {
    let listing: Listing =
        serde_json::from_str(body).with_context(|| format!("parsing {} listing", desc.name))?;

    let mut out = Vec::new();
    for child in listing.data.children {
        let post = child.data;
        if post.stickied {
            continue;
        }

        let title = sanitize_text(post.title.as_deref().unwrap_or_default());
        if title.is_empty() || !matches_ai_topic(&title) {
            continue;
        }

        let published_at = post
            .created_utc
            .and_then(|secs| Utc.timestamp_opt(secs as i64, 0).single());
        if !within_recency_window(published_at, now, window_hours) {
            continue;
        }

        let engagement = post.ups.saturating_add(post.num_comments);
        let description = {
            let text = sanitize_text(&post.selftext);
            if text.is_empty() {
                format!(
                    "Community discussion on {} with {} upvotes and {} comments.",
                    desc.name, post.ups, post.num_comments
                )
            } else {
                text
            }
        };

        let link = post
            .permalink
            .map(|p| format!("https://www.reddit.com{p}"))
            .or(post.url);

        let mut item = ContentItem::new(
            title,
            truncate_description(&description),
            link,
            desc.name.to_string(),
            desc.host.to_string(),
            published_at,
            desc.kind,
        );
        item.engagement = Some(engagement);
        out.push(item);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{self, ParserKind};

    fn forum_desc() -> SourceDescriptor {
        sources::tier1()
            .into_iter()
            .find(|s| s.parser == ParserKind::ForumJson)
            .expect("forum source in catalog")
    }

    fn listing(posts: &str) -> String {
        format!(r#"{{"data":{{"children":[{posts}]}}}}"#)
    }

    fn post_json(title: &str, created: i64) -> String {
        format!(
            r#"{{"data":{{"title":"{title}","selftext":"A longer discussion body that easily clears the quality filter threshold.","permalink":"/r/MachineLearning/comments/abc/x/","created_utc":{created},"ups":120,"num_comments":34,"stickied":false}}}}"#
        )
    }

    #[test]
    fn off_topic_titles_are_filtered_out() {
        let now = Utc::now();
        let body = listing(&format!(
            "{},{}",
            post_json("New LLM benchmark results for reasoning tasks", now.timestamp() - 600),
            post_json("My favorite hiking trails this summer", now.timestamp() - 600)
        ));
        let items = parse_hot_posts(&forum_desc(), &body, now, 72).expect("parse");
        assert_eq!(items.len(), 1);
        assert!(items[0].title.contains("LLM"));
        assert_eq!(items[0].engagement, Some(154));
    }

    #[test]
    fn permalink_is_expanded_to_absolute_url() {
        let now = Utc::now();
        let body = listing(&post_json("GPT-5 rumors roundup", now.timestamp() - 60));
        let items = parse_hot_posts(&forum_desc(), &body, now, 72).expect("parse");
        assert!(items[0].url.starts_with("https://www.reddit.com/r/"));
    }

    #[test]
    fn malformed_listing_is_an_error() {
        assert!(parse_hot_posts(&forum_desc(), "{not json", Utc::now(), 72).is_err());
    }
}
