use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::category::Category;
use crate::settings::DataSettings;
use crate::similarity::Similarity;
use crate::text::normalize;

/// A point of interest. Blank values count as missing.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TourismItem {
    #[serde(default, deserialize_with = "non_blank")]
    pub name: Option<String>,
    pub category: Category,
    #[serde(default, deserialize_with = "non_blank")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub timings_price: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub directions: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub map_url: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct QaEntry {
    pub question: String,
    pub answer: String,
}

fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Both datasets, loaded once and never modified.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeStore {
    items: Vec<TourismItem>,
    qa: Vec<QaEntry>,
}

impl KnowledgeStore {
    pub fn new(items: Vec<TourismItem>, qa: Vec<QaEntry>) -> Self {
        Self { items, qa }
    }

    pub fn load(data: &DataSettings) -> Result<Self> {
        let items = load_jsonl(&data.tourism_path())?;
        let qa = load_jsonl(&data.qa_path())?;
        Ok(Self::new(items, qa))
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn qa_count(&self) -> usize {
        self.qa.len()
    }

    /// First QA entry, in dataset order, whose question is similar enough.
    pub fn lookup_qa(
        &self,
        query: &str,
        similarity: &Similarity,
        threshold: f32,
    ) -> Option<&QaEntry> {
        let query = normalize(query);
        self.qa
            .iter()
            .find(|entry| similarity.score(&query, &normalize(&entry.question)) >= threshold)
    }

    pub fn filter_by_category(&self, category: &Category) -> Vec<&TourismItem> {
        self.items
            .iter()
            .filter(|item| &item.category == category)
            .collect()
    }

    /// First item whose name appears in the query, or failing that scores
    /// above `threshold` against it. Items without a name never match.
    pub fn match_by_name<'a>(
        items: &[&'a TourismItem],
        query: &str,
        similarity: &Similarity,
        threshold: f32,
    ) -> Option<&'a TourismItem> {
        let query = normalize(query);
        items.iter().copied().find(|item| {
            item.name.as_deref().map_or(false, |name| {
                let name = normalize(name);
                query.contains(&name) || similarity.score(&query, &name) >= threshold
            })
        })
    }
}

/// Reads one JSON object per line; blank lines are skipped.
fn load_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open dataset '{}'", path.display()))?;
    let mut records = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line)
            .with_context(|| format!("Invalid record on line {} of '{}'", i + 1, path.display()))?;
        records.push(record);
    }
    log::info!("Loaded {} records from {:?}", records.len(), path);
    Ok(records)
}
