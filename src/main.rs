//! Binary entrypoint: boots the Axum HTTP server around the digest pipeline.

use std::sync::Arc;

use ai_news_digest::api::{self, AppState};
use ai_news_digest::config::PipelineConfig;
use ai_news_digest::pipeline::DigestPipeline;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = PipelineConfig::from_env();
    let pipeline = DigestPipeline::new(cfg)?;
    let state = AppState {
        pipeline: Arc::new(pipeline),
    };

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "ai-news-digest listening");

    axum::serve(listener, api::router(state)).await?;
    Ok(())
}
