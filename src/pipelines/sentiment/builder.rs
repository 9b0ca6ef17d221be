use super::model::SentimentAnalysisModel;
use super::pipeline::SentimentAnalysisPipeline;
use crate::error::Result;
use crate::models::distilbert::DistilBertOptions;
use crate::pipelines::cache::{global_cache, ModelOptions};
use crate::pipelines::utils::{build_cache_key, DeviceRequest};
use tokenizers::Tokenizer;

/// Builder for creating [`SentimentAnalysisPipeline`] instances.
///
/// Use [`Self::distilbert`] as the entry point.
///
/// # Examples
///
/// ```rust,no_run
/// # use sentiment_analyzer::sentiment::SentimentAnalysisPipelineBuilder;
/// # fn main() -> sentiment_analyzer::error::Result<()> {
/// let pipeline = SentimentAnalysisPipelineBuilder::distilbert()
///     .cuda(0)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct SentimentAnalysisPipelineBuilder<M: SentimentAnalysisModel> {
    options: M::Options,
    device_request: DeviceRequest,
}

impl<M: SentimentAnalysisModel> SentimentAnalysisPipelineBuilder<M> {
    pub(crate) fn new(options: M::Options) -> Self {
        Self {
            options,
            device_request: DeviceRequest::Cpu,
        }
    }

    /// Use CPU for inference (default).
    pub fn cpu(mut self) -> Self {
        self.device_request = DeviceRequest::Cpu;
        self
    }

    /// Use a specific CUDA GPU for inference.
    pub fn cuda(mut self, index: usize) -> Self {
        self.device_request = DeviceRequest::Cuda(index);
        self
    }

    /// Use a specific Metal GPU for inference.
    pub fn metal(mut self, index: usize) -> Self {
        self.device_request = DeviceRequest::Metal(index);
        self
    }

    /// Use an already parsed device request.
    pub fn device(mut self, device_request: DeviceRequest) -> Self {
        self.device_request = device_request;
        self
    }

    /// Builds the pipeline with configured settings.
    ///
    /// Model weights and tokenizer are loaded once per process: later builds
    /// with the same options and device return handles to the cached copies.
    ///
    /// # Errors
    ///
    /// Returns an error if model loading or device initialization fails.
    pub fn build(self) -> Result<SentimentAnalysisPipeline<M>>
    where
        M: Send + Sync + 'static,
        M::Options: ModelOptions,
    {
        let device = self.device_request.resolve()?;
        let key = build_cache_key(&self.options, &device);

        let model = global_cache().get_or_create(&key, || {
            M::new(self.options.clone(), device.clone())
        })?;

        let tokenizer = global_cache().get_or_create::<Tokenizer, _>(
            &self.options.cache_key(),
            || M::get_tokenizer(self.options.clone()),
        )?;

        Ok(SentimentAnalysisPipeline { model, tokenizer })
    }
}

impl SentimentAnalysisPipelineBuilder<super::SentimentDistilBert> {
    /// Creates a builder for the SST-2 fine-tuned DistilBERT model.
    pub fn distilbert() -> Self {
        Self::new(DistilBertOptions::default())
    }

    /// Load a different DistilBERT sequence-classification checkpoint.
    pub fn model_repo(mut self, repo: impl Into<String>) -> Self {
        self.options.model_repo = repo.into();
        self
    }

    /// Repository to fetch `tokenizer.json` from when the model repo has none.
    pub fn tokenizer_repo(mut self, repo: impl Into<String>) -> Self {
        self.options.tokenizer_repo = Some(repo.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::distilbert::{DEFAULT_MODEL_REPO, DEFAULT_TOKENIZER_REPO};

    #[test]
    fn distilbert_defaults() {
        let builder = SentimentAnalysisPipelineBuilder::distilbert();
        assert_eq!(builder.options.model_repo, DEFAULT_MODEL_REPO);
        assert_eq!(
            builder.options.tokenizer_repo.as_deref(),
            Some(DEFAULT_TOKENIZER_REPO)
        );
        assert_eq!(builder.device_request, DeviceRequest::Cpu);
    }

    #[test]
    fn device_and_repo_overrides() {
        let builder = SentimentAnalysisPipelineBuilder::distilbert()
            .model_repo("org/custom-sst2")
            .tokenizer_repo("org/custom-base")
            .metal(1);
        assert_eq!(builder.options.model_repo, "org/custom-sst2");
        assert_eq!(builder.options.tokenizer_repo.as_deref(), Some("org/custom-base"));
        assert_eq!(builder.device_request, DeviceRequest::Metal(1));

        let builder = builder.device(DeviceRequest::Cuda(2)).cpu();
        assert_eq!(builder.device_request, DeviceRequest::Cpu);
    }
}
