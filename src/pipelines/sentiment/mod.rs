//! Sentiment analysis pipeline.
//!
//! Classify text as `POSITIVE` or `NEGATIVE`.
//! Returns both the predicted label and a confidence score.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sentiment_analyzer::sentiment::SentimentAnalysisPipelineBuilder;
//!
//! # fn main() -> sentiment_analyzer::error::Result<()> {
//! let pipeline = SentimentAnalysisPipelineBuilder::distilbert().build()?;
//!
//! let output = pipeline.run("I absolutely love this product!")?;
//! println!("sentiment: {} (confidence: {:.2})", output.prediction.label, output.prediction.score);
//! # Ok(())
//! # }
//! ```
//!
//! # Batch Inference
//!
//! ```rust,no_run
//! # use sentiment_analyzer::sentiment::SentimentAnalysisPipelineBuilder;
//! # fn main() -> sentiment_analyzer::error::Result<()> {
//! # let pipeline = SentimentAnalysisPipelineBuilder::distilbert().build()?;
//! let output = pipeline.run(&["Best purchase ever!", "Terrible quality."])?;
//!
//! for r in output.results {
//!     let p = r.prediction?;
//!     println!("{}: {} ({:.2})", r.text, p.label, p.score);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Supported Models
//!
//! | Model | Default checkpoint | Builder Method |
//! |-------|--------------------|----------------|
//! | DistilBERT | `distilbert-base-uncased-finetuned-sst-2-english` | [`SentimentAnalysisPipelineBuilder::distilbert`] |

// ============ Internal API ============

pub(crate) mod builder;
pub(crate) mod model;
pub(crate) mod pipeline;

// ============ Public API ============

pub use crate::models::distilbert::DistilBertOptions;
pub use crate::pipelines::stats::PipelineStats;
pub use crate::pipelines::utils::DeviceRequest;
pub use builder::SentimentAnalysisPipelineBuilder;
pub use model::{SentimentAnalysisModel, SentimentResult};
pub use pipeline::{
    BatchOutput, BatchResult, Label, Output, Prediction, SentimentAnalysisPipeline,
    SentimentClassifier,
};

#[doc(hidden)]
pub use pipeline::SentimentInput;

/// Only for generic annotations. Use [`SentimentAnalysisPipelineBuilder::distilbert`].
pub type SentimentDistilBert = crate::models::distilbert::SentimentDistilBertModel;
