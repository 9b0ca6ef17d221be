//! The process-wide classifier handle used by the server.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::config::ModelConfig;
use crate::error::Result;
use crate::sentiment::{
    SentimentAnalysisPipeline, SentimentAnalysisPipelineBuilder, SentimentClassifier,
    SentimentDistilBert,
};

static CLASSIFIER: OnceCell<SentimentAnalysisPipeline<SentimentDistilBert>> = OnceCell::new();

/// Loads the configured sentiment model on first call and returns the same
/// handle on every later call.
///
/// Only the first call's `config` is used. A failed load leaves the cell empty,
/// so the caller decides whether that is fatal.
pub fn shared_classifier(
    config: &ModelConfig,
) -> Result<&'static SentimentAnalysisPipeline<SentimentDistilBert>> {
    CLASSIFIER.get_or_try_init(|| {
        SentimentAnalysisPipelineBuilder::distilbert()
            .model_repo(config.model_repo.clone())
            .tokenizer_repo(config.tokenizer_repo.clone())
            .device(config.device)
            .build()
    })
}

/// [`shared_classifier`] as the trait object the web layer takes.
pub fn load_classifier(config: &ModelConfig) -> Result<Arc<dyn SentimentClassifier>> {
    let pipeline = shared_classifier(config)?;
    Ok(Arc::new(pipeline.clone()))
}
