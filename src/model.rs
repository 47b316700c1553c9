use anyhow::{bail, Context, Result};
use ndarray::{Array1, Array2};
use serde::Deserialize;
use std::fs::{read_to_string, File};
use std::io::{BufReader, Read};
#[cfg(test)]
use std::io::Write;
use std::path::Path;

use crate::category::Category;
use crate::error::ChatError;
use crate::settings::ModelSettings;
use crate::tokenizer::{Tokenizer, PAD_ID};

fn default_max_len() -> usize {
    50
}

#[derive(Deserialize, Debug, Clone)]
pub struct ModelConfig {
    pub vocab_size: usize,
    pub hidden_size: usize,
    pub num_labels: usize,
    #[serde(default = "default_max_len")]
    pub max_len: usize,
}

impl ModelConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let config_json = read_to_string(path_ref)
            .with_context(|| format!("Failed to read model config '{}'", path_ref.display()))?;
        let config: ModelConfig = serde_json::from_str(&config_json)?;
        Ok(config)
    }
}

/// Maps free text to one category label.
pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Category, ChatError>;
}

/// The pretrained intent model: token embeddings, mean pooling and a dense
/// softmax layer over the label vocabulary.
#[derive(Debug, Clone)]
pub struct SequenceClassifier {
    pub config: ModelConfig,
    tokenizer: Tokenizer,
    labels: Vec<Category>,
    embedding_matrix: Array2<f32>,
    dense_kernel: Array2<f32>,
    dense_bias: Array1<f32>,
}

impl SequenceClassifier {
    pub fn load(settings: &ModelSettings) -> Result<Self> {
        let config = ModelConfig::load_from_file(settings.path(&settings.config_file))?;
        let tokenizer = Tokenizer::load(settings.path(&settings.tokenizer_file))?;

        let labels_path = settings.path(&settings.labels_file);
        let labels_json = read_to_string(&labels_path)
            .with_context(|| format!("Failed to read labels '{}'", labels_path.display()))?;
        let labels: Vec<Category> = serde_json::from_str(&labels_json)
            .with_context(|| format!("Invalid labels file '{}'", labels_path.display()))?;

        let embedding_matrix = read_array2_file(settings.path(&settings.embedding_file))?;
        let dense_kernel = read_array2_file(settings.path(&settings.dense_kernel_file))?;
        let dense_bias = read_array2_file(settings.path(&settings.dense_bias_file))?;
        if dense_bias.nrows() != 1 {
            bail!("Dense bias must have exactly one row, found {}", dense_bias.nrows());
        }
        let dense_bias = dense_bias.row(0).to_owned();

        Self::from_parts(config, tokenizer, labels, embedding_matrix, dense_kernel, dense_bias)
    }

    pub fn from_parts(
        config: ModelConfig,
        tokenizer: Tokenizer,
        labels: Vec<Category>,
        embedding_matrix: Array2<f32>,
        dense_kernel: Array2<f32>,
        dense_bias: Array1<f32>,
    ) -> Result<Self> {
        if config.num_labels == 0 {
            bail!("Model declares no labels");
        }
        if labels.len() != config.num_labels {
            bail!(
                "Label vocabulary has {} entries but the model predicts {}",
                labels.len(),
                config.num_labels
            );
        }
        if embedding_matrix.dim() != (config.vocab_size, config.hidden_size) {
            bail!(
                "Embedding matrix shape {:?} does not match ({}, {})",
                embedding_matrix.dim(),
                config.vocab_size,
                config.hidden_size
            );
        }
        if dense_kernel.dim() != (config.hidden_size, config.num_labels) {
            bail!(
                "Dense kernel shape {:?} does not match ({}, {})",
                dense_kernel.dim(),
                config.hidden_size,
                config.num_labels
            );
        }
        if dense_bias.len() != config.num_labels {
            bail!("Dense bias has {} entries, expected {}", dense_bias.len(), config.num_labels);
        }
        if tokenizer.oov_id() >= config.vocab_size {
            bail!("OOV index {} is outside the embedding table", tokenizer.oov_id());
        }
        Ok(Self {
            config,
            tokenizer,
            labels,
            embedding_matrix,
            dense_kernel,
            dense_bias,
        })
    }

    pub fn labels(&self) -> &[Category] {
        &self.labels
    }

    /// Class probabilities for an already padded id sequence.
    pub fn predict(&self, token_ids: &[usize]) -> Array1<f32> {
        let mut pooled = Array1::<f32>::zeros(self.config.hidden_size);
        let mut count = 0usize;
        for &token_id in token_ids.iter().filter(|&&id| id != PAD_ID) {
            let id_to_use = if token_id < self.config.vocab_size {
                token_id
            } else {
                self.tokenizer.oov_id()
            };
            pooled += &self.embedding_matrix.row(id_to_use);
            count += 1;
        }
        if count > 0 {
            pooled /= count as f32;
        }
        let logits = pooled.dot(&self.dense_kernel) + &self.dense_bias;
        softmax(&logits)
    }
}

impl Classifier for SequenceClassifier {
    fn classify(&self, text: &str) -> Result<Category, ChatError> {
        let token_ids = self.tokenizer.encode(text, self.config.max_len);
        let probabilities = self.predict(&token_ids);
        let index = argmax(&probabilities).ok_or_else(|| {
            ChatError::Classification("model produced an empty distribution".to_string())
        })?;
        log::debug!("class {} with probability {:.3}", index, probabilities[index]);
        self.labels
            .get(index)
            .cloned()
            .ok_or(ChatError::UnknownLabel {
                index,
                size: self.labels.len(),
            })
    }
}

fn softmax(logits: &Array1<f32>) -> Array1<f32> {
    let max = logits.fold(f32::NEG_INFINITY, |acc, &x| acc.max(x));
    let exp = logits.mapv(|x| (x - max).exp());
    let sum = exp.sum();
    if sum > 0.0 {
        exp / sum
    } else {
        exp
    }
}

/// Index of the largest value; the first one wins on ties.
fn argmax(values: &Array1<f32>) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, b)) if !(v > b) => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

/// Little-endian `rows: u64, cols: u64` header followed by row-major f32s.
#[cfg(test)]
pub fn write_array2<W: Write>(array: &Array2<f32>, writer: &mut W) -> Result<()> {
    let (rows, cols) = array.dim();
    let mut bytes = Vec::with_capacity(16 + array.len() * 4);
    bytes.extend_from_slice(&(rows as u64).to_le_bytes());
    bytes.extend_from_slice(&(cols as u64).to_le_bytes());
    bytes.extend(array.iter().flat_map(|value| value.to_le_bytes()));
    writer.write_all(&bytes)?;
    Ok(())
}

fn read_array2_file<P: AsRef<Path>>(path: P) -> Result<Array2<f32>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open matrix '{}'", path.display()))?;
    read_array2(&mut BufReader::new(file))
        .with_context(|| format!("Failed to read matrix '{}'", path.display()))
}

fn read_dimension<R: Read>(reader: &mut R) -> Result<usize> {
    let mut buf = [0u8; 8];
    reader
        .read_exact(&mut buf)
        .context("Matrix header is truncated")?;
    usize::try_from(u64::from_le_bytes(buf)).context("Matrix dimension does not fit in memory")
}

/// The header is checked against the bytes actually present before any
/// element storage is allocated.
fn read_array2<R: Read>(reader: &mut R) -> Result<Array2<f32>> {
    let rows = read_dimension(reader)?;
    let cols = read_dimension(reader)?;
    let Some(expected_bytes) = rows.checked_mul(cols).and_then(|n| n.checked_mul(4)) else {
        bail!("Matrix shape ({}, {}) overflows", rows, cols);
    };

    let mut payload = Vec::new();
    reader.read_to_end(&mut payload)?;
    if payload.len() != expected_bytes {
        bail!(
            "Matrix shape ({}, {}) needs {} bytes of data, found {}",
            rows,
            cols,
            expected_bytes,
            payload.len()
        );
    }

    let data = payload
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    Array2::from_shape_vec((rows, cols), data).context("Shape and data mismatch")
}
