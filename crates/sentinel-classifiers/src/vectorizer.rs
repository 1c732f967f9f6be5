//! TF-IDF vectorization of normalized token lists

use serde::{Deserialize, Serialize};
use sentinel_core::{Error, Result};
use std::collections::{BTreeMap, HashMap};

/// Vectorizer hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Smallest and largest n-gram length, inclusive
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),

    /// Vocabulary cap; the most frequent terms are kept
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Minimum number of documents a term must appear in
    #[serde(default = "default_min_df")]
    pub min_df: usize,

    /// Maximum fraction of documents a term may appear in
    #[serde(default = "default_max_df")]
    pub max_df: f64,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 2)
}

fn default_max_features() -> usize {
    5000
}

fn default_min_df() -> usize {
    2
}

fn default_max_df() -> f64 {
    0.8
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            ngram_range: default_ngram_range(),
            max_features: default_max_features(),
            min_df: default_min_df(),
            max_df: default_max_df(),
        }
    }
}

impl VectorizerConfig {
    pub fn validate(&self) -> Result<()> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(Error::config(format!(
                "Invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }
        if self.max_features == 0 {
            return Err(Error::config("max_features must be at least 1"));
        }
        if self.min_df == 0 {
            return Err(Error::config("min_df must be at least 1"));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(Error::config(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        Ok(())
    }
}

/// Sparse row with strictly increasing indices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseVector {
    /// Build from (index, value) pairs; zero values are dropped
    pub fn from_pairs(mut pairs: Vec<(usize, f64)>) -> Self {
        pairs.sort_by_key(|(idx, _)| *idx);
        pairs.dedup_by_key(|(idx, _)| *idx);
        let (indices, values) = pairs.into_iter().filter(|(_, v)| *v != 0.0).unzip();
        Self { indices, values }
    }

    /// Value at `index`, zero when absent
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Fitted TF-IDF vectorizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    config: VectorizerConfig,
    /// Term to column; columns follow alphabetical term order
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    n_documents: usize,
}

impl TfIdfVectorizer {
    /// Fit vocabulary and IDF weights on normalized documents
    pub fn fit(config: VectorizerConfig, documents: &[Vec<String>]) -> Result<Self> {
        config.validate()?;
        if documents.is_empty() {
            return Err(Error::training("Cannot fit vectorizer on zero documents"));
        }

        let n_documents = documents.len();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        let mut term_frequency: HashMap<String, usize> = HashMap::new();

        for document in documents {
            let counts = count_terms(document, config.ngram_range);
            for (term, count) in counts {
                *term_frequency.entry(term.clone()).or_default() += count;
                *document_frequency.entry(term).or_default() += 1;
            }
        }

        let max_doc_count = config.max_df * n_documents as f64;
        let mut kept: Vec<(String, usize)> = term_frequency
            .into_iter()
            .filter(|(term, _)| {
                let df = document_frequency[term];
                df >= config.min_df && df as f64 <= max_doc_count
            })
            .collect();

        // Most frequent first; ties broken by term order
        kept.sort_by(|(a_term, a_count), (b_term, b_count)| {
            b_count.cmp(a_count).then_with(|| a_term.cmp(b_term))
        });
        kept.truncate(config.max_features);

        if kept.is_empty() {
            return Err(Error::training(
                "Empty vocabulary after pruning; training messages contain no usable terms",
            ));
        }

        let mut terms: Vec<String> = kept.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let idf = terms
            .iter()
            .map(|term| {
                let df = document_frequency[term] as f64;
                ((1.0 + n_documents as f64) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term, idx))
            .collect();

        Ok(Self {
            config,
            vocabulary,
            idf,
            n_documents,
        })
    }

    /// L2-normalized TF-IDF row; unknown terms are ignored
    pub fn transform(&self, tokens: &[String]) -> SparseVector {
        let mut pairs: Vec<(usize, f64)> = count_terms(tokens, self.config.ngram_range)
            .into_iter()
            .filter_map(|(term, count)| {
                self.vocabulary
                    .get(&term)
                    .map(|&idx| (idx, count as f64 * self.idf[idx]))
            })
            .collect();
        // Fixed summation order keeps the norm bit-identical across calls
        pairs.sort_by_key(|(idx, _)| *idx);

        let norm = pairs.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm == 0.0 {
            return SparseVector::default();
        }

        SparseVector::from_pairs(pairs.into_iter().map(|(idx, v)| (idx, v / norm)).collect())
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    #[cfg(test)]
    fn contains(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    /// Structural check for deserialized vectorizers
    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;
        if self.vocabulary.is_empty() {
            return Err(Error::model("Vectorizer has an empty vocabulary"));
        }
        if self.idf.len() != self.vocabulary.len() {
            return Err(Error::model(format!(
                "Vectorizer has {} terms but {} idf weights",
                self.vocabulary.len(),
                self.idf.len()
            )));
        }
        let mut seen = vec![false; self.idf.len()];
        for &idx in self.vocabulary.values() {
            if idx >= seen.len() || seen[idx] {
                return Err(Error::model(format!(
                    "Vectorizer vocabulary has invalid column {}",
                    idx
                )));
            }
            seen[idx] = true;
        }
        if self.idf.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(Error::model("Vectorizer has non-positive idf weight"));
        }
        Ok(())
    }
}

/// Raw n-gram counts for one document
fn count_terms(tokens: &[String], (min_n, max_n): (usize, usize)) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for n in min_n..=max_n {
        if n > tokens.len() {
            break;
        }
        for window in tokens.windows(n) {
            *counts.entry(window.join(" ")).or_default() += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Vec<String> {
        text.split_whitespace().map(String::from).collect()
    }

    /// Keeps terms seen in a single document
    fn keep_rare() -> VectorizerConfig {
        VectorizerConfig {
            min_df: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_fit_builds_unigrams_and_bigrams() {
        let docs = vec![doc("free prize now"), doc("team meet tomorrow")];
        let vectorizer = TfIdfVectorizer::fit(keep_rare(), &docs).unwrap();

        assert_eq!(vectorizer.vocabulary_size(), 10);
        assert!(vectorizer.contains("free prize"));
        assert!(vectorizer.contains("meet tomorrow"));
        assert!(!vectorizer.contains("now team"));
    }

    #[test]
    fn test_max_df_prunes_common_terms() {
        let docs = vec![doc("common alpha"), doc("common beta"), doc("common gamma")];
        let config = VectorizerConfig {
            ngram_range: (1, 1),
            min_df: 1,
            ..Default::default()
        };
        let vectorizer = TfIdfVectorizer::fit(config, &docs).unwrap();

        assert!(!vectorizer.contains("common"));
        assert_eq!(vectorizer.vocabulary_size(), 3);
    }

    #[test]
    fn test_default_min_df_drops_single_document_terms() {
        let docs = vec![
            doc("free prize now"),
            doc("free cash today"),
            doc("team meet tomorrow"),
        ];
        let vectorizer = TfIdfVectorizer::fit(VectorizerConfig::default(), &docs).unwrap();

        assert_eq!(vectorizer.vocabulary_size(), 1);
        assert!(vectorizer.contains("free"));
        assert!(!vectorizer.contains("prize"));
        assert!(!vectorizer.contains("free prize"));
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let docs = vec![doc("a a a b"), doc("b c"), doc("d")];
        let config = VectorizerConfig {
            ngram_range: (1, 1),
            max_features: 2,
            min_df: 1,
            max_df: 1.0,
            ..Default::default()
        };
        let vectorizer = TfIdfVectorizer::fit(config, &docs).unwrap();

        assert!(vectorizer.contains("a"));
        assert!(vectorizer.contains("b"));
        assert!(!vectorizer.contains("c"));
    }

    #[test]
    fn test_empty_vocabulary_is_training_error() {
        let docs = vec![Vec::new(), Vec::new()];
        let err = TfIdfVectorizer::fit(VectorizerConfig::default(), &docs).unwrap_err();
        assert!(matches!(err, Error::Training(_)));
    }

    #[test]
    fn test_transform_is_unit_length() {
        let docs = vec![doc("free prize now"), doc("team meet tomorrow")];
        let vectorizer = TfIdfVectorizer::fit(keep_rare(), &docs).unwrap();

        let row = vectorizer.transform(&doc("free prize prize"));
        let norm: f64 = row.values.iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
        assert!(row.indices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_unknown_terms_map_to_zero_vector() {
        let docs = vec![doc("free prize"), doc("team meet")];
        let vectorizer = TfIdfVectorizer::fit(keep_rare(), &docs).unwrap();

        assert!(vectorizer.transform(&doc("completely unseen")).is_empty());
        assert!(vectorizer.transform(&[]).is_empty());
    }

    #[test]
    fn test_smooth_idf() {
        let docs = vec![doc("x y"), doc("x z"), doc("w")];
        let config = VectorizerConfig {
            ngram_range: (1, 1),
            min_df: 1,
            max_df: 1.0,
            ..Default::default()
        };
        let vectorizer = TfIdfVectorizer::fit(config, &docs).unwrap();

        // "x" appears in two of three documents
        let row = vectorizer.transform(&doc("x"));
        assert_eq!(row.nnz(), 1);
        let idx = row.indices[0];
        assert!((vectorizer.idf[idx] - ((4.0f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = VectorizerConfig {
            ngram_range: (2, 1),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = VectorizerConfig {
            max_df: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sparse_vector_get() {
        let v = SparseVector::from_pairs(vec![(5, 0.5), (1, 0.25), (3, 0.0)]);
        assert_eq!(v.indices, vec![1, 5]);
        assert_eq!(v.get(5), 0.5);
        assert_eq!(v.get(3), 0.0);
    }
}
