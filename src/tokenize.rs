//! Token counting for generated text.
//!
//! The counter is an external collaborator: anything that maps text to a
//! sequence of token ids works. [`HfTokenizer`] loads a Hugging Face
//! `tokenizer.json` either from disk or from the Hub.

use crate::error::ProbeError;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;
use walkdir::WalkDir;

pub const TOKENIZER_FILE: &str = "tokenizer.json";

pub trait TokenCounter: Send + Sync + 'static {
    fn encode(&self, text: &str) -> Result<Vec<u32>, ProbeError>;

    fn count(&self, text: &str) -> Result<usize, ProbeError> {
        Ok(self.encode(text)?.len())
    }
}

pub struct HfTokenizer {
    inner: Tokenizer,
    add_special_tokens: bool,
}

impl HfTokenizer {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProbeError> {
        let path = path.as_ref();
        let inner = Tokenizer::from_file(path)
            .map_err(|e| ProbeError::Tokenizer(format!("load {}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), "tokenizer loaded");
        Ok(Self { inner, add_special_tokens: true })
    }

    /// Accepts either a `tokenizer.json` or a directory holding one
    /// somewhere below it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProbeError> {
        let path = path.as_ref();
        if path.is_dir() {
            let found = find_tokenizer_file(path).ok_or_else(|| {
                ProbeError::Tokenizer(format!("no {TOKENIZER_FILE} under {}", path.display()))
            })?;
            Self::from_file(found)
        } else {
            Self::from_file(path)
        }
    }

    /// Fetches `tokenizer.json` for `model_id` through the Hub cache.
    /// Blocking; run it off the async runtime.
    pub fn from_hub(model_id: &str, token: Option<String>) -> Result<Self, ProbeError> {
        let mut builder = hf_hub::api::sync::ApiBuilder::new();
        // keep the cached login unless a token is given explicitly
        if token.is_some() {
            builder = builder.with_token(token);
        }
        let api = builder
            .build()
            .map_err(|e| ProbeError::Tokenizer(format!("hub client: {e}")))?;
        tracing::info!(model = model_id, "fetching tokenizer from hub");
        let path = api
            .model(model_id.to_string())
            .get(TOKENIZER_FILE)
            .map_err(|e| ProbeError::Tokenizer(format!("download {model_id}/{TOKENIZER_FILE}: {e}")))?;
        Self::from_file(path)
    }

    pub fn with_special_tokens(mut self, add: bool) -> Self {
        self.add_special_tokens = add;
        self
    }
}

impl TokenCounter for HfTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, ProbeError> {
        let encoding = self
            .inner
            .encode(text, self.add_special_tokens)
            .map_err(|e| ProbeError::Tokenizer(format!("encode: {e}")))?;
        Ok(encoding.get_ids().to_vec())
    }
}

fn find_tokenizer_file(root: &Path) -> Option<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .find(|entry| entry.file_type().is_file() && entry.file_name() == TOKENIZER_FILE)
        .map(|entry| entry.into_path())
}
