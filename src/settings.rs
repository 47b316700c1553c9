use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Service settings. Every field has a default so the service starts with no
/// `Config.toml` at all.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub model: ModelSettings,
    pub data: DataSettings,
    pub logic: LogicSettings,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ModelSettings {
    pub dir: PathBuf,
    pub config_file: String,
    pub tokenizer_file: String,
    pub labels_file: String,
    pub embedding_file: String,
    pub dense_kernel_file: String,
    pub dense_bias_file: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("model"),
            config_file: "model_config.json".to_string(),
            tokenizer_file: "tokenizer.json".to_string(),
            labels_file: "labels.json".to_string(),
            embedding_file: "embedding.bin".to_string(),
            dense_kernel_file: "dense_kernel.bin".to_string(),
            dense_bias_file: "dense_bias.bin".to_string(),
        }
    }
}

impl ModelSettings {
    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    pub fn required_files(&self) -> Vec<PathBuf> {
        [
            &self.config_file,
            &self.tokenizer_file,
            &self.labels_file,
            &self.embedding_file,
            &self.dense_kernel_file,
            &self.dense_bias_file,
        ]
        .iter()
        .map(|file| self.path(file))
        .collect()
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DataSettings {
    pub dir: PathBuf,
    pub tourism_file: String,
    pub qa_file: String,
    /// GloVe-format vectors; unset or unreadable means word-overlap scoring.
    pub word_vectors_file: Option<String>,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            tourism_file: "tourism_data.jsonl".to_string(),
            qa_file: "qa_data.jsonl".to_string(),
            word_vectors_file: None,
        }
    }
}

impl DataSettings {
    pub fn tourism_path(&self) -> PathBuf {
        self.dir.join(&self.tourism_file)
    }

    pub fn qa_path(&self) -> PathBuf {
        self.dir.join(&self.qa_file)
    }

    pub fn word_vectors_path(&self) -> Option<PathBuf> {
        self.word_vectors_file.as_ref().map(|file| self.dir.join(file))
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LogicSettings {
    pub qa_threshold: f32,
    pub name_threshold: f32,
    pub recommendation_limit: usize,
}

impl Default for LogicSettings {
    fn default() -> Self {
        Self {
            qa_threshold: 0.7,
            name_threshold: 0.8,
            recommendation_limit: 5,
        }
    }
}

impl Settings {
    /// Reads `Config.toml` (optional), `TOURISM__*` variables and `PORT`.
    pub fn load() -> Result<Self> {
        Self::from_sources(Path::new("Config"), std::env::var("PORT").ok())
    }

    pub fn from_sources(file: &Path, port: Option<String>) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(file).required(false))
            .add_source(Environment::with_prefix("TOURISM").separator("__"))
            .set_override_option("server.port", port)?
            .build()?
            .try_deserialize::<Settings>()?;
        Ok(settings)
    }
}
