//! Statistical models making up the ensemble
//!
//! Each model maps a TF-IDF row to a scam probability in [0, 1]. Models are
//! fitted once per training run and never updated incrementally.

pub mod gradient_boost;
pub mod naive_bayes;
pub mod random_forest;
pub mod tree;

pub use gradient_boost::{GradientBoost, GradientBoostConfig};
pub use naive_bayes::{NaiveBayes, NaiveBayesConfig};
pub use random_forest::{RandomForest, RandomForestConfig};

use crate::vectorizer::SparseVector;
use sentinel_core::{Error, Result};

/// Common interface of the three ensemble members
pub trait ScamModel: Send + Sync {
    /// Stable model name used in logs and analytics
    fn name(&self) -> &str;

    /// Fit on vectorized rows; `labels[i]` is true for scam
    fn fit(&mut self, rows: &[SparseVector], labels: &[bool], n_features: usize) -> Result<()>;

    /// Scam probability for one row
    fn predict_probability(&self, row: &SparseVector) -> f64;

    /// Structural check after deserialization
    fn validate(&self, n_features: usize) -> Result<()>;
}

/// Shared input checks for every `fit`
pub(crate) fn check_training_input(rows: &[SparseVector], labels: &[bool]) -> Result<()> {
    if rows.len() != labels.len() {
        return Err(Error::training(format!(
            "Got {} rows but {} labels",
            rows.len(),
            labels.len()
        )));
    }
    if !labels.iter().any(|l| *l) || labels.iter().all(|l| *l) {
        return Err(Error::training(
            "Training data must contain both scam and legitimate examples",
        ));
    }
    Ok(())
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
