//! A small interactive sentiment analysis demo.
//!
//! Text typed into a single web page is classified as positive or negative
//! by a pre-trained DistilBERT model running locally through
//! [Candle](https://github.com/huggingface/candle), and the page recolors
//! itself to match the verdict.
//!
//! The library half is usable on its own:
//!
//! ```rust,no_run
//! use sentiment_analyzer::sentiment::SentimentAnalysisPipelineBuilder;
//!
//! # fn main() -> sentiment_analyzer::error::Result<()> {
//! let pipeline = SentimentAnalysisPipelineBuilder::distilbert().build()?;
//! let output = pipeline.run("I love this!")?;
//! println!("{} ({:.2})", output.prediction.label, output.prediction.score);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// ============ Internal API ============

pub(crate) mod loaders;
pub(crate) mod models;
pub(crate) mod pipelines;

// ============ Public API ============

pub mod classifier;
pub mod config;
pub mod error;
pub mod presentation;
pub mod web;

pub use pipelines::sentiment;
