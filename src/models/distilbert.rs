use candle_core::{DType, Device, IndexOp, Module, Tensor, D};
use candle_nn::{linear, ops::softmax, Linear, VarBuilder};
use candle_transformers::models::distilbert::{Config, DistilBertModel};
use serde::Deserialize;
use std::collections::HashMap;
use tokenizers::{Encoding, Tokenizer};

use crate::error::{PipelineError, Result};
use crate::loaders::{HfLoader, TokenizerLoader};
use crate::pipelines::sentiment::model::{SentimentAnalysisModel, SentimentResult};

/// SST-2 fine-tuned DistilBERT, labels `NEGATIVE` / `POSITIVE`.
pub const DEFAULT_MODEL_REPO: &str = "distilbert/distilbert-base-uncased-finetuned-sst-2-english";

/// Base checkpoint sharing the vocabulary; it ships the `tokenizer.json` the
/// fine-tuned repo lacks.
pub const DEFAULT_TOKENIZER_REPO: &str = "distilbert/distilbert-base-uncased";

/// Which DistilBERT checkpoint to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistilBertOptions {
    /// Hugging Face repository holding `config.json` and the weights.
    pub model_repo: String,
    /// Repository to take `tokenizer.json` from when `model_repo` has none.
    pub tokenizer_repo: Option<String>,
}

impl Default for DistilBertOptions {
    fn default() -> Self {
        Self {
            model_repo: DEFAULT_MODEL_REPO.to_string(),
            tokenizer_repo: Some(DEFAULT_TOKENIZER_REPO.to_string()),
        }
    }
}

impl std::fmt::Display for DistilBertOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.model_repo)
    }
}

impl crate::pipelines::cache::ModelOptions for DistilBertOptions {
    fn cache_key(&self) -> String {
        match &self.tokenizer_repo {
            Some(tokenizer_repo) => format!("distilbert:{}+{}", self.model_repo, tokenizer_repo),
            None => format!("distilbert:{}", self.model_repo),
        }
    }
}

/// `pre_classifier -> ReLU -> classifier` over the `[CLS]` hidden state.
struct ClassificationHead {
    pre_classifier: Linear,
    classifier: Linear,
}

impl ClassificationHead {
    fn load(vb: VarBuilder, dim: usize, num_labels: usize) -> Result<Self> {
        Ok(Self {
            pre_classifier: linear(dim, dim, vb.pp("pre_classifier"))?,
            classifier: linear(dim, num_labels, vb.pp("classifier"))?,
        })
    }
}

impl Module for ClassificationHead {
    fn forward(&self, cls: &Tensor) -> candle_core::Result<Tensor> {
        let hidden = self.pre_classifier.forward(cls)?.relu()?;
        self.classifier.forward(&hidden)
    }
}

/// DistilBERT encoder with the sequence-classification head from the checkpoint.
pub struct SentimentDistilBertModel {
    encoder: DistilBertModel,
    head: ClassificationHead,
    device: Device,
    id2label: HashMap<u32, String>,
    model_id: String,
}

impl SentimentDistilBertModel {
    /// Download (or reuse from the hub cache) and load the checkpoint onto `device`.
    pub fn new(options: DistilBertOptions, device: Device) -> Result<Self> {
        let repo_id = options.model_repo.as_str();
        tracing::info!(model = repo_id, device = ?device.location(), "loading sentiment model");

        let config_path = HfLoader::new(repo_id, "config.json").load()?;
        let weights_path = HfLoader::new(repo_id, "model.safetensors")
            .load()
            .or_else(|_| HfLoader::new(repo_id, "pytorch_model.bin").load())?;

        let config_str = std::fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        let class_cfg: ClassifierConfigJson = serde_json::from_str(&config_str)?;
        let id2label = class_cfg.id2label()?;

        let vb = if weights_path.extension().is_some_and(|e| e == "safetensors") {
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)? }
        } else {
            VarBuilder::from_pth(&weights_path, DType::F32, &device)?
        };

        let encoder = DistilBertModel::load(vb.pp("distilbert"), &config)?;
        let head = ClassificationHead::load(vb, class_cfg.dim, id2label.len())?;

        tracing::info!(model = repo_id, labels = id2label.len(), "sentiment model ready");

        Ok(Self {
            encoder,
            head,
            device,
            id2label,
            model_id: repo_id.to_string(),
        })
    }

    /// Load the tokenizer for `options`.
    pub fn get_tokenizer(options: DistilBertOptions) -> Result<Tokenizer> {
        TokenizerLoader::new(&options.model_repo, options.tokenizer_repo.as_deref()).load()
    }

    /// Softmax class probabilities for each encoding, padded to a common length.
    fn class_probabilities(
        &self,
        encodings: &[&Encoding],
        pad_token_id: u32,
    ) -> Result<Vec<Vec<f32>>> {
        let max_len = encodings.iter().map(|e| e.len()).max().unwrap_or(0);
        let batch_size = encodings.len();

        let mut all_token_ids: Vec<u32> = Vec::with_capacity(batch_size * max_len);
        // DistilBERT attention masks mark *hidden* positions with 1.
        let mut all_padding: Vec<u8> = Vec::with_capacity(batch_size * max_len);

        for encoding in encodings {
            let mut token_ids = encoding.get_ids().to_vec();
            let mut padding: Vec<u8> = encoding
                .get_attention_mask()
                .iter()
                .map(|&attend| u8::from(attend == 0))
                .collect();
            token_ids.resize(max_len, pad_token_id);
            padding.resize(max_len, 1);
            all_token_ids.extend(token_ids);
            all_padding.extend(padding);
        }

        let input_ids = Tensor::from_vec(all_token_ids, (batch_size, max_len), &self.device)?;
        let mask = Tensor::from_vec(all_padding, (batch_size, 1, 1, max_len), &self.device)?;

        let hidden = self.encoder.forward(&input_ids, &mask)?;
        let cls = hidden.i((.., 0))?;
        let logits = self.head.forward(&cls)?;
        let probs = softmax(&logits, D::Minus1)?;

        Ok(probs.to_vec2::<f32>()?)
    }
}

impl SentimentAnalysisModel for SentimentDistilBertModel {
    type Options = DistilBertOptions;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        SentimentDistilBertModel::new(options, device)
    }

    fn predict_with_score(&self, tokenizer: &Tokenizer, text: &str) -> Result<SentimentResult> {
        self.predict_with_score_batch(tokenizer, &[text])?
            .pop()
            .ok_or_else(|| PipelineError::Unexpected("Model returned no predictions".into()))?
    }

    fn predict_with_score_batch(
        &self,
        tokenizer: &Tokenizer,
        texts: &[&str],
    ) -> Result<Vec<Result<SentimentResult>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let pad_token_id = tokenizer
            .get_padding()
            .map(|p| p.pad_id)
            .or_else(|| tokenizer.token_to_id("[PAD]"))
            .unwrap_or(0);

        let encodings: Vec<Result<Encoding>> = texts
            .iter()
            .map(|text| {
                tokenizer.encode(*text, true).map_err(|e| {
                    PipelineError::Tokenization(format!(
                        "Tokenization failed on '{}': {}",
                        &text.chars().take(50).collect::<String>(),
                        e
                    ))
                })
            })
            .collect();

        let valid: Vec<&Encoding> = encodings.iter().filter_map(|e| e.as_ref().ok()).collect();
        let mut probabilities = if valid.is_empty() {
            Vec::new()
        } else {
            self.class_probabilities(&valid, pad_token_id)?
        }
        .into_iter();

        Ok(encodings
            .into_iter()
            .map(|encoding| {
                encoding.and_then(|_| {
                    let probs = probabilities.next().ok_or_else(|| {
                        PipelineError::Unexpected("Model returned too few predictions".into())
                    })?;
                    pick_label(&probs, &self.id2label)
                })
            })
            .collect())
    }

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer> {
        Self::get_tokenizer(options)
    }

    fn device(&self) -> &Device {
        &self.device
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Picks the most probable class and reports its probability as the score.
fn pick_label(probs: &[f32], id2label: &HashMap<u32, String>) -> Result<SentimentResult> {
    let (pred_id, score) = probs
        .iter()
        .copied()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .ok_or_else(|| PipelineError::Unexpected("Model produced no class scores".into()))?;

    let label = id2label.get(&(pred_id as u32)).cloned().ok_or_else(|| {
        let mut available: Vec<&String> = id2label.values().collect();
        available.sort();
        PipelineError::Unexpected(format!(
            "Predicted label ID {} not in id2label. Available: {}",
            pred_id,
            available
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })?;

    Ok(SentimentResult {
        label,
        score: score.clamp(0.0, 1.0),
    })
}

#[derive(Deserialize)]
struct ClassifierConfigJson {
    dim: usize,
    #[serde(default)]
    id2label: HashMap<String, String>,
    #[serde(default)]
    num_labels: Option<usize>,
}

impl ClassifierConfigJson {
    fn id2label(&self) -> Result<HashMap<u32, String>> {
        if self.id2label.is_empty() {
            let num_labels = self.num_labels.unwrap_or(2);
            return Ok((0..num_labels as u32)
                .map(|i| (i, format!("LABEL_{i}")))
                .collect());
        }

        self.id2label
            .iter()
            .map(|(id, label)| {
                id.parse::<u32>()
                    .map(|id| (id, label.clone()))
                    .map_err(|_| {
                        PipelineError::Unexpected(format!(
                            "Invalid id2label key '{id}' in model config"
                        ))
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sst2_labels() -> HashMap<u32, String> {
        HashMap::from([(0, "NEGATIVE".to_string()), (1, "POSITIVE".to_string())])
    }

    #[test]
    fn picks_most_probable_label() {
        let result = pick_label(&[0.1, 0.9], &sst2_labels()).unwrap();
        assert_eq!(result.label, "POSITIVE");
        assert!((result.score - 0.9).abs() < f32::EPSILON);

        let result = pick_label(&[0.7, 0.3], &sst2_labels()).unwrap();
        assert_eq!(result.label, "NEGATIVE");
    }

    #[test]
    fn unknown_class_id_is_an_error() {
        let labels = HashMap::from([(0, "NEGATIVE".to_string())]);
        let err = pick_label(&[0.2, 0.8], &labels).unwrap_err();
        assert!(err.to_string().contains("not in id2label"));
    }

    #[test]
    fn empty_scores_are_an_error() {
        assert!(pick_label(&[], &sst2_labels()).is_err());
    }

    #[test]
    fn parses_sst2_config() {
        let raw = r#"{
            "activation": "gelu",
            "dim": 768,
            "id2label": {"0": "NEGATIVE", "1": "POSITIVE"},
            "label2id": {"NEGATIVE": 0, "POSITIVE": 1},
            "model_type": "distilbert"
        }"#;
        let cfg: ClassifierConfigJson = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.dim, 768);
        assert_eq!(cfg.id2label().unwrap(), sst2_labels());
    }

    #[test]
    fn missing_id2label_gets_generic_names() {
        let cfg: ClassifierConfigJson = serde_json::from_str(r#"{"dim": 8}"#).unwrap();
        let labels = cfg.id2label().unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[&1], "LABEL_1");
    }

    #[test]
    fn cache_key_includes_tokenizer_repo() {
        use crate::pipelines::cache::ModelOptions;

        let options = DistilBertOptions::default();
        assert_eq!(
            options.cache_key(),
            format!("distilbert:{DEFAULT_MODEL_REPO}+{DEFAULT_TOKENIZER_REPO}")
        );
        let bare = DistilBertOptions {
            tokenizer_repo: None,
            ..options
        };
        assert_eq!(bare.cache_key(), format!("distilbert:{DEFAULT_MODEL_REPO}"));
    }
}
