use anyhow::{bail, Context, Result};
use ndarray::Array1;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::text::{word_set, words};

/// Text similarity in [0, 1]. The variant is picked once at startup.
#[derive(Debug, Clone)]
pub enum Similarity {
    /// Cosine of averaged word vectors.
    Semantic(WordVectors),
    /// Jaccard overlap of lowercase word sets.
    WordOverlap,
}

impl Similarity {
    /// Uses word vectors when `path` is set and loads, word overlap otherwise.
    pub fn select(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("No word vectors configured, using word-overlap similarity");
            return Similarity::WordOverlap;
        };
        match WordVectors::load_glove(path) {
            Ok(vectors) => {
                log::info!(
                    "Using semantic similarity with {} word vectors of dimension {}",
                    vectors.len(),
                    vectors.dim()
                );
                Similarity::Semantic(vectors)
            }
            Err(e) => {
                log::warn!("Word vectors unavailable ({:#}), using word-overlap similarity", e);
                Similarity::WordOverlap
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Similarity::Semantic(_) => "semantic",
            Similarity::WordOverlap => "word-overlap",
        }
    }

    pub fn score(&self, a: &str, b: &str) -> f32 {
        match self {
            Similarity::Semantic(vectors) => vectors.similarity(a, b),
            Similarity::WordOverlap => jaccard_similarity(a, b),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WordVectors {
    vectors: HashMap<String, Array1<f32>>,
    dim: usize,
}

impl WordVectors {
    pub fn new(vectors: HashMap<String, Array1<f32>>) -> Result<Self> {
        let Some(dim) = vectors.values().next().map(|v| v.len()) else {
            bail!("No word vectors given");
        };
        if vectors.values().any(|v| v.len() != dim) {
            bail!("Word vectors have inconsistent dimensions");
        }
        Ok(Self { vectors, dim })
    }

    /// Loads GloVe text vectors (`word v1 ... vn` per line). The dimension is
    /// taken from the first well-formed line.
    pub fn load_glove(path: &Path) -> Result<Self> {
        log::info!("Loading word vectors from '{}'...", path.display());
        let file = File::open(path)
            .with_context(|| format!("Failed to open word vectors at '{}'", path.display()))?;
        let reader = BufReader::new(file);
        let mut vectors = HashMap::new();
        let mut dim = None;
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };
            let Ok(vector) = parts.map(str::parse).collect::<Result<Vec<f32>, _>>() else {
                log::warn!("Skipping line #{} due to vector parsing error", i + 1);
                continue;
            };
            if vector.is_empty() || dim.map_or(false, |d| d != vector.len()) {
                log::warn!("Skipping malformed line #{} in word vector file", i + 1);
                continue;
            }
            dim = Some(vector.len());
            vectors.insert(word.to_lowercase(), Array1::from(vector));
        }
        Self::new(vectors)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn text_vector(&self, text: &str) -> Option<Array1<f32>> {
        let mut sum = Array1::<f32>::zeros(self.dim);
        let mut count = 0usize;
        for word in words(text) {
            if let Some(vector) = self.vectors.get(&word) {
                sum += vector;
                count += 1;
            }
        }
        (count > 0).then(|| sum / count as f32)
    }

    /// Zero when either text has no known word.
    pub fn similarity(&self, a: &str, b: &str) -> f32 {
        match (self.text_vector(a), self.text_vector(b)) {
            (Some(va), Some(vb)) => cosine_similarity(&va, &vb).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}

/// Zero when either vector has no magnitude.
pub fn cosine_similarity(a: &Array1<f32>, b: &Array1<f32>) -> f32 {
    let magnitude = (a.dot(a) * b.dot(b)).sqrt();
    if magnitude > 0.0 {
        a.dot(b) / magnitude
    } else {
        0.0
    }
}

pub fn jaccard_similarity(text1: &str, text2: &str) -> f32 {
    let set1 = word_set(text1);
    let set2 = word_set(text2);
    let intersection = set1.intersection(&set2).count();
    let union = set1.union(&set2).count();
    intersection as f32 / union.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    fn vectors() -> WordVectors {
        let map = HashMap::from([
            ("park".to_string(), array![1.0, 0.0, 0.0]),
            ("garden".to_string(), array![0.9, 0.1, 0.0]),
            ("hotel".to_string(), array![0.0, 1.0, 0.0]),
            ("cold".to_string(), array![-1.0, 0.0, 0.0]),
        ]);
        WordVectors::new(map).unwrap()
    }

    #[test]
    fn jaccard_identical_is_one() {
        assert_eq!(jaccard_similarity("Lalbagh Botanical Garden", "lalbagh botanical garden"), 1.0);
    }

    #[test]
    fn jaccard_partial_overlap() {
        let score = jaccard_similarity("best hotels in bangalore", "hotels in bangalore");
        assert!((score - 0.75).abs() < 1e-6);
    }

    #[test]
    fn jaccard_empty_is_zero() {
        assert_eq!(jaccard_similarity("", ""), 0.0);
        assert_eq!(jaccard_similarity("", "park"), 0.0);
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&array![0.0, 0.0], &array![1.0, 2.0]), 0.0);
        let score = cosine_similarity(&array![3.0, 4.0], &array![6.0, 8.0]);
        assert!((score - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&array![1.0, 0.0], &array![-1.0, 0.0]), -1.0);
    }

    #[test]
    fn semantic_scores_related_words_high() {
        let similarity = Similarity::Semantic(vectors());
        assert!(similarity.score("park", "garden") > 0.9);
        assert!(similarity.score("park", "hotel") < 0.1);
    }

    #[test]
    fn semantic_clamps_and_handles_unknown_words() {
        let v = vectors();
        assert_eq!(v.similarity("park", "cold"), 0.0);
        assert_eq!(v.similarity("zzz", "park"), 0.0);
        assert_eq!(v.similarity("", ""), 0.0);
    }

    #[test]
    fn select_falls_back_without_vectors() {
        assert_eq!(Similarity::select(None).name(), "word-overlap");
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        assert_eq!(Similarity::select(Some(missing.as_path())).name(), "word-overlap");
    }

    #[test]
    fn select_loads_glove_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.txt");
        std::fs::write(&path, "park 1 0\ngarden 0.9 0.1\nbroken 1\nbad x y\n").unwrap();
        match Similarity::select(Some(path.as_path())) {
            Similarity::Semantic(v) => {
                assert_eq!(v.len(), 2);
                assert_eq!(v.dim(), 2);
            }
            Similarity::WordOverlap => panic!("expected semantic similarity"),
        }
    }

    proptest! {
        #[test]
        fn jaccard_is_total_and_symmetric(a in ".{0,40}", b in ".{0,40}") {
            let ab = jaccard_similarity(&a, &b);
            prop_assert!((0.0..=1.0).contains(&ab));
            prop_assert_eq!(ab, jaccard_similarity(&b, &a));
        }

        #[test]
        fn jaccard_self_similarity(a in "[a-z]{1,8}( [a-z]{1,8}){0,5}") {
            prop_assert_eq!(jaccard_similarity(&a, &a), 1.0);
        }

        #[test]
        fn semantic_is_bounded(a in "[a-z ]{0,30}", b in "[a-z ]{0,30}") {
            let score = vectors().similarity(&a, &b);
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }
}
