use crate::error::Result;
use tokenizers::Tokenizer;

/// Raw model output: the label string from the checkpoint's `id2label` and its probability.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentResult {
    /// Label name as written in the model config.
    pub label: String,
    /// Probability of `label` (0.0 to 1.0).
    pub score: f32,
}

/// A sequence-classification model that can back a [`SentimentAnalysisPipeline`](super::SentimentAnalysisPipeline).
pub trait SentimentAnalysisModel {
    /// Options that select the checkpoint; also the cache key source.
    type Options: std::fmt::Debug + Clone;

    /// Load the model onto `device`.
    fn new(options: Self::Options, device: candle_core::Device) -> Result<Self>
    where
        Self: Sized;

    /// Predict sentiment and return both label + confidence score.
    fn predict_with_score(&self, tokenizer: &Tokenizer, text: &str) -> Result<SentimentResult>;

    /// Predict a batch of inputs, returning label and score for each entry.
    fn predict_with_score_batch(
        &self,
        tokenizer: &Tokenizer,
        texts: &[&str],
    ) -> Result<Vec<Result<SentimentResult>>> {
        Ok(texts
            .iter()
            .map(|text| self.predict_with_score(tokenizer, text))
            .collect())
    }

    /// Load the tokenizer matching `options`.
    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer>;

    /// Device the weights live on.
    fn device(&self) -> &candle_core::Device;

    /// Hub repository (or other identifier) of the loaded checkpoint.
    fn model_id(&self) -> &str;
}
