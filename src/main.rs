use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sentiment_analyzer::classifier::load_classifier;
use sentiment_analyzer::config::AppConfig;
use sentiment_analyzer::web::{self, AppState};

const DEFAULT_LOG_FILTER: &str = "sentiment_analyzer=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = AppConfig::parse();
    tracing::info!(
        model = %config.model.model_repo,
        device = %config.model.device,
        "starting Sentiment Analyzer"
    );

    // Model load failures are fatal.
    let model_config = config.model.clone();
    let classifier = tokio::task::spawn_blocking(move || load_classifier(&model_config))
        .await
        .context("model loading task panicked")?
        .with_context(|| format!("failed to load sentiment model '{}'", config.model.model_repo))?;

    let state = AppState::new(classifier).context("failed to prepare the page template")?;

    web::serve(config.bind_addr(), state)
        .await
        .with_context(|| format!("server error on {}", config.bind_addr()))
}
