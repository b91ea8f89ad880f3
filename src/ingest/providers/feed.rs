// src/ingest/providers/feed.rs
//! Syndication parser: RSS `<item>` and Atom `<entry>` blocks via structural
//! matching, normalized into `ContentItem`s. One malformed document yields an
//! error that the tier fetcher downgrades to zero items.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::ingest::types::{ContentItem, ContentKind};
use crate::ingest::{sanitize_text, truncate_description, within_recency_window};
use crate::sources::{ParserKind, SourceDescriptor};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    summary: Option<String>,
    // quick-xml's serde deserializer strips namespace prefixes, so
    // `<content:encoded>` and `<itunes:duration>` arrive as local names.
    #[serde(rename = "encoded")]
    content: Option<String>,
    #[serde(rename = "duration")]
    itunes_duration: Option<String>,
}

/// Element that may carry attributes (`type="html"`) around its text.
#[derive(Debug, Default, Deserialize)]
struct TextNode {
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<TextNode>,
    summary: Option<TextNode>,
    content: Option<TextNode>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
    #[serde(rename = "group")]
    media: Option<MediaGroup>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediaGroup {
    #[serde(rename = "description")]
    description: Option<TextNode>,
}

fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        // chrono accepts obsolete zone names ("GMT") that `time` may reject.
        .or_else(|| {
            DateTime::parse_from_rfc2822(ts)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

fn parse_rfc3339(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Accept either wire format; feeds in the wild mix them.
fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    parse_rfc2822(ts).or_else(|| parse_rfc3339(ts))
}

/// Bare entities like `&nbsp;` are not valid XML; scrub before parsing.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

pub fn parse_feed(
    desc: &SourceDescriptor,
    body: &str,
    now: DateTime<Utc>,
    window_hours: i64,
) -> Result<Vec<ContentItem>> {
    let t0 = std::time::Instant::now();
    let xml = scrub_html_entities_for_xml(body);

    let items = match desc.parser {
        ParserKind::Rss => parse_rss_items(desc, &xml, now, window_hours)?,
        ParserKind::Atom => parse_atom_entries(desc, &xml, now, window_hours)?,
        other => bail!("parse_feed called with non-feed parser {other:?}"),
    };

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("digest_parse_ms").record(ms);
    counter!("digest_items_total").increment(items.len() as u64);
    Ok(items)
}

fn parse_rss_items(
    desc: &SourceDescriptor,
    xml: &str,
    now: DateTime<Utc>,
    window_hours: i64,
) -> Result<Vec<ContentItem>> {
    let rss: Rss = from_str(xml).with_context(|| format!("parsing {} rss", desc.name))?;

    let mut out = Vec::with_capacity(rss.channel.items.len());
    for it in rss.channel.items {
        let title = sanitize_text(it.title.as_deref().unwrap_or_default());
        if title.is_empty() {
            continue;
        }

        let published_at = it.pub_date.as_deref().and_then(parse_timestamp);
        if !within_recency_window(published_at, now, window_hours) {
            continue;
        }

        // First non-empty of description / summary / content.
        let raw_desc = [&it.description, &it.summary, &it.content]
            .into_iter()
            .flatten()
            .map(|s| sanitize_text(s))
            .find(|s| !s.is_empty())
            .unwrap_or_default();

        let mut item = ContentItem::new(
            title,
            truncate_description(&raw_desc),
            it.link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
            desc.name.to_string(),
            desc.host.to_string(),
            published_at,
            desc.kind,
        );
        if desc.kind == ContentKind::Audio {
            item.duration = it.itunes_duration.map(|d| d.trim().to_string());
        }
        out.push(item);
    }
    Ok(out)
}

fn parse_atom_entries(
    desc: &SourceDescriptor,
    xml: &str,
    now: DateTime<Utc>,
    window_hours: i64,
) -> Result<Vec<ContentItem>> {
    let feed: Feed = from_str(xml).with_context(|| format!("parsing {} atom", desc.name))?;

    let mut out = Vec::with_capacity(feed.entries.len());
    for entry in feed.entries {
        let title = sanitize_text(
            entry
                .title
                .as_ref()
                .and_then(|t| t.value.as_deref())
                .unwrap_or_default(),
        );
        if title.is_empty() {
            continue;
        }

        let published_at = entry
            .updated
            .as_deref()
            .or(entry.published.as_deref())
            .and_then(parse_timestamp);
        if !within_recency_window(published_at, now, window_hours) {
            continue;
        }

        let media_desc = entry
            .media
            .as_ref()
            .and_then(|m| m.description.as_ref())
            .and_then(|d| d.value.clone());
        let raw_desc = [
            entry.summary.as_ref().and_then(|n| n.value.clone()),
            entry.content.as_ref().and_then(|n| n.value.clone()),
            media_desc,
        ]
        .into_iter()
        .flatten()
        .map(|s| sanitize_text(&s))
        .find(|s| !s.is_empty())
        .unwrap_or_default();

        let link = entry
            .links
            .iter()
            .find(|l| l.rel.as_deref() == Some("alternate"))
            .or_else(|| entry.links.iter().find(|l| l.rel.is_none()))
            .or_else(|| entry.links.first())
            .and_then(|l| l.href.clone());

        out.push(ContentItem::new(
            title,
            truncate_description(&raw_desc),
            link,
            desc.name.to_string(),
            desc.host.to_string(),
            published_at,
            desc.kind,
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc2822_and_rfc3339_both_parse() {
        assert!(parse_timestamp("Tue, 20 Aug 2024 10:00:00 GMT").is_some());
        assert!(parse_timestamp("2024-08-20T10:00:00Z").is_some());
        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn malformed_document_is_an_error_not_a_panic() {
        let desc = crate::sources::tier1()
            .into_iter()
            .find(|s| s.parser == ParserKind::Rss)
            .expect("rss source in catalog");
        let res = parse_feed(&desc, "<rss><channel><item>", Utc::now(), 72);
        assert!(res.is_err());
    }
}
