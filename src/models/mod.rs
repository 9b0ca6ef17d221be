// ============ Model implementations ============

pub(crate) mod distilbert;

pub use distilbert::{DEFAULT_MODEL_REPO, DEFAULT_TOKENIZER_REPO};
