use super::model::SentimentAnalysisModel;
use crate::error::{PipelineError, Result};
use crate::pipelines::stats::PipelineStats;
use std::fmt;
use std::sync::Arc;
use tokenizers::Tokenizer;

// ============ Output types ============

/// Sentiment class reported by the model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    /// `POSITIVE`
    Positive,
    /// `NEGATIVE`
    Negative,
    /// Any other label a checkpoint may report. The SST-2 model never does.
    Other(String),
}

impl Label {
    /// Parses a checkpoint label, case-insensitively.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("positive") {
            Label::Positive
        } else if trimmed.eq_ignore_ascii_case("negative") {
            Label::Negative
        } else {
            Label::Other(trimmed.to_string())
        }
    }

    /// Canonical upper-case name.
    pub fn as_str(&self) -> &str {
        match self {
            Label::Positive => "POSITIVE",
            Label::Negative => "NEGATIVE",
            Label::Other(name) => name,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sentiment prediction with label and confidence score.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// The predicted sentiment.
    pub label: Label,
    /// Confidence score (0.0 to 1.0).
    pub score: f32,
}

/// Single-text output from `run()`.
#[derive(Debug)]
pub struct Output {
    /// Sentiment prediction.
    pub prediction: Prediction,
    /// Execution statistics.
    pub stats: PipelineStats,
}

/// Single result in batch output.
#[derive(Debug)]
pub struct BatchResult {
    /// Input text.
    pub text: String,
    /// Prediction or error for this input.
    pub prediction: Result<Prediction>,
}

/// Batch output from `run()`.
#[derive(Debug)]
pub struct BatchOutput {
    /// Results for each input.
    pub results: Vec<BatchResult>,
    /// Execution statistics.
    pub stats: PipelineStats,
}

// ============ Input trait for type-based dispatch ============

#[doc(hidden)]
pub trait SentimentInput<'a> {
    /// Output type for `.run()`.
    type Output;

    #[doc(hidden)]
    fn into_texts(self) -> Vec<&'a str>;
    #[doc(hidden)]
    fn convert_output(
        texts: Vec<&'a str>,
        predictions: Vec<Result<Prediction>>,
        stats: PipelineStats,
    ) -> Result<Self::Output>;
}

impl<'a> SentimentInput<'a> for &'a str {
    type Output = Output;

    fn into_texts(self) -> Vec<&'a str> {
        vec![self]
    }

    fn convert_output(
        _texts: Vec<&'a str>,
        mut predictions: Vec<Result<Prediction>>,
        stats: PipelineStats,
    ) -> Result<Self::Output> {
        let prediction = predictions
            .pop()
            .ok_or_else(|| PipelineError::Unexpected("No predictions returned".into()))??;
        Ok(Output { prediction, stats })
    }
}

fn batch_output<'a>(
    texts: Vec<&'a str>,
    predictions: Vec<Result<Prediction>>,
    stats: PipelineStats,
) -> BatchOutput {
    let results = texts
        .into_iter()
        .zip(predictions)
        .map(|(text, prediction)| BatchResult {
            text: text.to_string(),
            prediction,
        })
        .collect();
    BatchOutput { results, stats }
}

impl<'a> SentimentInput<'a> for &'a [&'a str] {
    type Output = BatchOutput;

    fn into_texts(self) -> Vec<&'a str> {
        self.to_vec()
    }

    fn convert_output(
        texts: Vec<&'a str>,
        predictions: Vec<Result<Prediction>>,
        stats: PipelineStats,
    ) -> Result<Self::Output> {
        Ok(batch_output(texts, predictions, stats))
    }
}

impl<'a, const N: usize> SentimentInput<'a> for &'a [&'a str; N] {
    type Output = BatchOutput;

    fn into_texts(self) -> Vec<&'a str> {
        self.as_slice().to_vec()
    }

    fn convert_output(
        texts: Vec<&'a str>,
        predictions: Vec<Result<Prediction>>,
        stats: PipelineStats,
    ) -> Result<Self::Output> {
        Ok(batch_output(texts, predictions, stats))
    }
}

// ============ Pipeline ============

/// Classifies text sentiment as positive or negative.
///
/// Construct with [`SentimentAnalysisPipelineBuilder`](super::SentimentAnalysisPipelineBuilder).
/// Cloning is cheap: clones share the cached model and tokenizer.
///
/// # Examples
///
/// ```rust,no_run
/// # use sentiment_analyzer::sentiment::SentimentAnalysisPipelineBuilder;
/// # fn main() -> sentiment_analyzer::error::Result<()> {
/// let pipeline = SentimentAnalysisPipelineBuilder::distilbert().build()?;
///
/// // Single text - direct access
/// let output = pipeline.run("I love this!")?;
/// println!("{}: {:.2}", output.prediction.label, output.prediction.score);
///
/// // Batch - results include input text
/// let output = pipeline.run(&["Great!", "Terrible."])?;
/// for r in output.results {
///     println!("{} → {}", r.text, r.prediction?.label);
/// }
/// # Ok(())
/// # }
/// ```
pub struct SentimentAnalysisPipeline<M: SentimentAnalysisModel> {
    pub(crate) model: Arc<M>,
    pub(crate) tokenizer: Arc<Tokenizer>,
}

impl<M: SentimentAnalysisModel> Clone for SentimentAnalysisPipeline<M> {
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
            tokenizer: Arc::clone(&self.tokenizer),
        }
    }
}

impl<M: SentimentAnalysisModel> SentimentAnalysisPipeline<M> {
    /// Analyze text sentiment.
    ///
    /// Single input → [`Output`], batch → [`BatchOutput`]. Blank text is never
    /// sent to the model: a single blank input fails with
    /// [`PipelineError::EmptyInput`], a blank batch entry gets that error as its result.
    pub fn run<'a, I: SentimentInput<'a>>(&self, input: I) -> Result<I::Output> {
        let stats_builder = PipelineStats::start();
        let texts = input.into_texts();
        let item_count = texts.len();

        let submitted: Vec<&str> = texts
            .iter()
            .copied()
            .filter(|text| !text.trim().is_empty())
            .collect();

        let mut results = self
            .model
            .predict_with_score_batch(&self.tokenizer, &submitted)?
            .into_iter();

        let predictions: Vec<Result<Prediction>> = texts
            .iter()
            .map(|text| {
                if text.trim().is_empty() {
                    return Err(PipelineError::EmptyInput);
                }
                let result = results.next().ok_or_else(|| {
                    PipelineError::Unexpected("Model returned too few predictions".into())
                })??;
                tracing::debug!(label = %result.label, score = result.score, "classified text");
                Ok(Prediction {
                    label: Label::parse(&result.label),
                    score: result.score,
                })
            })
            .collect();

        I::convert_output(texts, predictions, stats_builder.finish(item_count))
    }

    /// Returns the device (CPU/GPU) the model is running on.
    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }

    /// Identifier of the loaded checkpoint.
    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }
}

/// One-text-in, one-prediction-out view of a sentiment model.
///
/// The web UI depends on this rather than on a concrete pipeline.
pub trait SentimentClassifier: Send + Sync {
    /// Classify a single non-blank text.
    fn classify(&self, text: &str) -> Result<Prediction>;

    /// Identifier of the model behind the classifier.
    fn model_id(&self) -> &str;
}

impl<M> SentimentClassifier for SentimentAnalysisPipeline<M>
where
    M: SentimentAnalysisModel + Send + Sync,
{
    fn classify(&self, text: &str) -> Result<Prediction> {
        self.run(text).map(|output| output.prediction)
    }

    fn model_id(&self) -> &str {
        SentimentAnalysisPipeline::model_id(self)
    }
}
