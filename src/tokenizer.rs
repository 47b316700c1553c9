use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::read_to_string;
use std::path::Path;

use crate::text::{filter_and_split, DEFAULT_FILTERS};

pub const PAD_ID: usize = 0;
const DEFAULT_OOV_ID: usize = 1;

/// Word index exported alongside the trained model.
#[derive(Deserialize, Debug, Clone)]
pub struct TokenizerConfig {
    pub word_index: HashMap<String, usize>,
    #[serde(default)]
    pub oov_token: Option<String>,
    #[serde(default)]
    pub num_words: Option<usize>,
    #[serde(default)]
    pub filters: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    vocab: HashMap<String, usize>,
    oov_id: usize,
    num_words: Option<usize>,
    filters: String,
}

impl Tokenizer {
    pub fn from_config(config: TokenizerConfig) -> Self {
        let oov_id = config
            .oov_token
            .as_ref()
            .and_then(|token| config.word_index.get(token))
            .copied()
            .unwrap_or(DEFAULT_OOV_ID);
        Self {
            vocab: config.word_index,
            oov_id,
            num_words: config.num_words,
            filters: config.filters.unwrap_or_else(|| DEFAULT_FILTERS.to_string()),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = read_to_string(path)
            .with_context(|| format!("Failed to read tokenizer at '{}'", path.display()))?;
        let config: TokenizerConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid tokenizer file '{}'", path.display()))?;
        Ok(Self::from_config(config))
    }

    pub fn oov_id(&self) -> usize {
        self.oov_id
    }

    /// Maps each word to its index; words outside the vocabulary (or beyond
    /// `num_words`) map to the OOV index.
    pub fn texts_to_sequence(&self, text: &str) -> Vec<usize> {
        filter_and_split(text, &self.filters)
            .iter()
            .map(|word| match self.vocab.get(word) {
                Some(&id) if self.num_words.map_or(true, |limit| id < limit) => id,
                _ => self.oov_id,
            })
            .collect()
    }

    /// Tokenizes and left-pads (or keeps the trailing `max_len` ids) to a
    /// fixed length.
    pub fn encode(&self, text: &str, max_len: usize) -> Vec<usize> {
        pad_sequence(&self.texts_to_sequence(text), max_len)
    }
}

pub fn pad_sequence(ids: &[usize], max_len: usize) -> Vec<usize> {
    let kept = &ids[ids.len().saturating_sub(max_len)..];
    let mut padded = vec![PAD_ID; max_len - kept.len()];
    padded.extend_from_slice(kept);
    padded
}
