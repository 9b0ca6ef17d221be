use std::path::PathBuf;
use std::time::Duration;

use hf_hub::api::sync::Api;
use tokenizers::Tokenizer;

use crate::error::{PipelineError, Result};

const MAX_RETRIES: u32 = 3;

/// Fetches a single file from a Hugging Face model repository into the local hub cache.
#[derive(Debug, Clone)]
pub struct HfLoader {
    pub repo: String,
    pub filename: String,
}

impl HfLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            filename: filename.into(),
        }
    }

    pub fn load(&self) -> Result<PathBuf> {
        let hf_api = Api::new().map_err(|e| {
            PipelineError::Download(format!("Failed to initialize HuggingFace API: {e}"))
        })?;
        let hf_repo = hf_api.model(self.repo.clone());

        let mut attempts = 0u32;

        for attempt in 0..MAX_RETRIES {
            attempts = attempt + 1;
            match hf_repo.get(self.filename.as_str()) {
                Ok(path) => return Ok(path),
                Err(e) => {
                    let error_msg = e.to_string();
                    if is_lock_contention(&error_msg) && attempt < MAX_RETRIES - 1 {
                        let wait_time = backoff(attempt);
                        tracing::debug!(
                            repo = %self.repo,
                            file = %self.filename,
                            ?wait_time,
                            "hub cache locked, retrying"
                        );
                        std::thread::sleep(wait_time);
                        continue;
                    }
                    return Err(PipelineError::Download(format!(
                        "Failed to download '{}' from '{}': {}",
                        self.filename, self.repo, error_msg
                    )));
                }
            }
        }

        Err(PipelineError::Download(format!(
            "Download timed out for '{}' from '{}' after {} attempt(s)",
            self.filename, self.repo, attempts
        )))
    }
}

fn is_lock_contention(error_msg: &str) -> bool {
    error_msg.contains("Lock acquisition failed")
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(100 * (1 << attempt))
}

/// Loads `tokenizer.json`, falling back to a second repository when the
/// model repository does not ship one.
#[derive(Debug, Clone)]
pub struct TokenizerLoader {
    pub primary: HfLoader,
    pub fallback: Option<HfLoader>,
}

impl TokenizerLoader {
    pub fn new(repo: &str, fallback_repo: Option<&str>) -> Self {
        Self {
            primary: HfLoader::new(repo, "tokenizer.json"),
            fallback: fallback_repo
                .filter(|fallback| *fallback != repo)
                .map(|fallback| HfLoader::new(fallback, "tokenizer.json")),
        }
    }

    pub fn load(&self) -> Result<Tokenizer> {
        let tokenizer_file_path = match (self.primary.load(), &self.fallback) {
            (Ok(path), _) => path,
            (Err(primary_err), Some(fallback)) => {
                tracing::info!(
                    repo = %self.primary.repo,
                    fallback = %fallback.repo,
                    "no tokenizer.json in model repo, using fallback"
                );
                fallback.load().map_err(|fallback_err| {
                    PipelineError::Download(format!("{primary_err}; fallback: {fallback_err}"))
                })?
            }
            (Err(primary_err), None) => return Err(primary_err),
        };
        let path_str = tokenizer_file_path.display().to_string();

        Tokenizer::from_file(&tokenizer_file_path).map_err(|e| {
            PipelineError::Tokenization(format!(
                "Failed to load tokenizer from '{}': {}",
                path_str, e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        assert_eq!(backoff(0), Duration::from_millis(100));
        assert_eq!(backoff(1), Duration::from_millis(200));
        assert_eq!(backoff(2), Duration::from_millis(400));
    }

    #[test]
    fn only_lock_errors_are_retried() {
        assert!(is_lock_contention("Lock acquisition failed: /tmp/x.lock"));
        assert!(!is_lock_contention("request error: 404 Not Found"));
    }

    #[test]
    fn fallback_skipped_when_same_repo() {
        let loader = TokenizerLoader::new("org/model", Some("org/model"));
        assert!(loader.fallback.is_none());

        let loader = TokenizerLoader::new("org/model", Some("org/base"));
        let fallback = loader.fallback.expect("fallback loader");
        assert_eq!(fallback.repo, "org/base");
        assert_eq!(fallback.filename, "tokenizer.json");
    }
}
