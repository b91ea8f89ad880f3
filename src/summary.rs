// src/summary.rs
//! Summarization collaborator: provider abstraction with an OpenAI-backed
//! client, a disabled client, and a deterministic mock. Every failure path
//! (timeout, non-success status, malformed payload, missing key) collapses to
//! `None`, and the pipeline substitutes the local fallback summary.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::SummaryProvider;
use crate::digest::TopStory;

/// Trait object used by the digest assembler.
pub trait SummaryClient: Send + Sync {
    /// Summarize the prompt, returning a short paragraph, or `None` on any
    /// failure.
    fn summarize<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynSummaryClient = Arc<dyn SummaryClient>;

/// Factory: build a client from the explicit pipeline configuration.
pub fn build_client(provider: &SummaryProvider) -> DynSummaryClient {
    match provider {
        SummaryProvider::Disabled => Arc::new(DisabledSummarizer),
        SummaryProvider::Mock { text } => Arc::new(MockSummarizer {
            fixed: text.clone(),
        }),
        SummaryProvider::OpenAi { api_key, model } => {
            Arc::new(OpenAiSummarizer::new(api_key.clone(), model.clone()))
        }
    }
}

/// OpenAI chat-completions summarizer. Requires a key; bounded timeout.
pub struct OpenAiSummarizer {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiSummarizer {
    pub fn new(api_key: String, model: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("ai-news-digest/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key,
            model,
        }
    }

    async fn summarize_impl(&self, prompt: &str) -> Option<String> {
        if self.api_key.is_empty() {
            return None;
        }

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let sys = "You are a news editor. Write ONE short paragraph (2-3 sentences) summarizing today's AI news from the bullet list. Neutral tone, no emojis, no markdown. Output only the paragraph.";
        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: sys,
                },
                Msg {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.3,
            max_tokens: 160,
        };

        let resp = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .ok()?;
        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "summarizer returned non-success");
            return None;
        }
        let body: Resp = resp.json().await.ok()?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or("");
        let cleaned = sanitize_summary(content);
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    }
}

impl SummaryClient for OpenAiSummarizer {
    fn summarize<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(self.summarize_impl(prompt))
    }
    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

/// Returns `None` always; used when no collaborator is configured.
pub struct DisabledSummarizer;

impl SummaryClient for DisabledSummarizer {
    fn summarize<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async { None })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Fixed response for tests and local runs.
pub struct MockSummarizer {
    pub fixed: String,
}

impl SummaryClient for MockSummarizer {
    fn summarize<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        let out = self.fixed.clone();
        Box::pin(async move { Some(out) })
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Cap on how many stories enter the prompt.
const PROMPT_STORIES: usize = 5;

/// Bulleted prompt from the capped, ordered top subset.
pub fn build_prompt(stories: &[TopStory]) -> String {
    let mut out = String::from("Top AI stories right now:\n");
    for story in stories.iter().take(PROMPT_STORIES) {
        out.push_str(&format!("- {} ({})\n", story.title, story.source));
    }
    out
}

/// Deterministic local fallback: names the item count and the top sources.
pub fn fallback_summary(total_items: usize, stories: &[TopStory]) -> String {
    let mut sources: Vec<&str> = Vec::new();
    for story in stories {
        if !sources.contains(&story.source.as_str()) {
            sources.push(&story.source);
        }
    }
    match sources.len() {
        0 => format!(
            "Today's digest covers {total_items} AI stories across blogs, podcasts and videos."
        ),
        1 => format!(
            "Today's digest covers {total_items} AI stories, led by coverage from {}.",
            sources[0]
        ),
        _ => format!(
            "Today's digest covers {total_items} AI stories, led by coverage from {} and {}.",
            sources[..sources.len() - 1].join(", "),
            sources[sources.len() - 1]
        ),
    }
}

/// Ask the collaborator; substitute the local fallback on any failure.
pub async fn summarize_or_fallback(
    client: &DynSummaryClient,
    total_items: usize,
    stories: &[TopStory],
) -> String {
    let prompt = build_prompt(stories);
    match client.summarize(&prompt).await {
        Some(text) => text,
        None => {
            tracing::info!(provider = client.provider_name(), "using local fallback summary");
            fallback_summary(total_items, stories)
        }
    }
}

/// Single line, collapsed whitespace, length-capped.
pub fn sanitize_summary(input: &str) -> String {
    let mut out = String::with_capacity(400);
    let mut prev_space = false;
    for ch in input.chars() {
        let c = match ch {
            '\r' | '\n' | '\t' => ' ',
            c => c,
        };
        if c == ' ' {
            if !prev_space && !out.is_empty() {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(c);
            prev_space = false;
        }
        if out.chars().count() >= 400 {
            break;
        }
    }
    out.trim().to_string()
}
