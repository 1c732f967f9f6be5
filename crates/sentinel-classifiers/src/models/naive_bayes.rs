//! Multinomial Naive Bayes over TF-IDF weights

use super::{check_training_input, ScamModel};
use crate::vectorizer::SparseVector;
use serde::{Deserialize, Serialize};
use sentinel_core::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesConfig {
    /// Additive (Laplace) smoothing
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

fn default_alpha() -> f64 {
    1.0
}

impl Default for NaiveBayesConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
        }
    }
}

/// Log prior and per-feature log likelihoods of one class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ClassModel {
    log_prior: f64,
    feature_log_prob: Vec<f64>,
}

impl ClassModel {
    fn fit(rows: &[&SparseVector], n_total: usize, n_features: usize, alpha: f64) -> Self {
        let mut counts = vec![0.0; n_features];
        for row in rows {
            for (feature, value) in row.iter() {
                if feature < n_features {
                    counts[feature] += value;
                }
            }
        }
        let denominator = counts.iter().sum::<f64>() + alpha * n_features as f64;

        Self {
            log_prior: (rows.len() as f64 / n_total as f64).ln(),
            feature_log_prob: counts
                .iter()
                .map(|c| ((c + alpha) / denominator).ln())
                .collect(),
        }
    }

    fn joint_log_likelihood(&self, row: &SparseVector) -> f64 {
        self.log_prior
            + row
                .iter()
                .filter_map(|(f, v)| self.feature_log_prob.get(f).map(|lp| v * lp))
                .sum::<f64>()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayes {
    config: NaiveBayesConfig,
    legitimate: ClassModel,
    scam: ClassModel,
    trained: bool,
}

impl NaiveBayes {
    pub fn new(config: NaiveBayesConfig) -> Self {
        Self {
            config,
            legitimate: ClassModel::default(),
            scam: ClassModel::default(),
            trained: false,
        }
    }
}

impl ScamModel for NaiveBayes {
    fn name(&self) -> &str {
        "naive_bayes"
    }

    fn fit(&mut self, rows: &[SparseVector], labels: &[bool], n_features: usize) -> Result<()> {
        check_training_input(rows, labels)?;
        if !(self.config.alpha > 0.0) {
            return Err(Error::config(format!(
                "naive_bayes alpha must be positive, got {}",
                self.config.alpha
            )));
        }

        let (scam_rows, legit_rows): (Vec<(&SparseVector, &bool)>, Vec<_>) =
            rows.iter().zip(labels).partition(|(_, label)| **label);
        let scam_rows: Vec<&SparseVector> = scam_rows.into_iter().map(|(r, _)| r).collect();
        let legit_rows: Vec<&SparseVector> = legit_rows.into_iter().map(|(r, _)| r).collect();

        self.scam = ClassModel::fit(&scam_rows, rows.len(), n_features, self.config.alpha);
        self.legitimate = ClassModel::fit(&legit_rows, rows.len(), n_features, self.config.alpha);
        self.trained = true;
        Ok(())
    }

    fn predict_probability(&self, row: &SparseVector) -> f64 {
        if !self.trained {
            return 0.0;
        }
        let scam = self.scam.joint_log_likelihood(row);
        let legitimate = self.legitimate.joint_log_likelihood(row);
        // Posterior via log-sum-exp: 1 / (1 + exp(legit - scam))
        super::sigmoid(scam - legitimate)
    }

    fn validate(&self, n_features: usize) -> Result<()> {
        if !self.trained {
            return Err(Error::model("naive_bayes is not trained"));
        }
        for class in [&self.scam, &self.legitimate] {
            if class.feature_log_prob.len() != n_features {
                return Err(Error::model(format!(
                    "naive_bayes has {} features, vectorizer has {}",
                    class.feature_log_prob.len(),
                    n_features
                )));
            }
            if !class.log_prior.is_finite() || class.feature_log_prob.iter().any(|p| !p.is_finite())
            {
                return Err(Error::model("naive_bayes has non-finite parameters"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;

    #[test]
    fn test_separates_classes() {
        let (rows, labels) = fixtures::separable();
        let mut model = NaiveBayes::new(NaiveBayesConfig::default());
        model.fit(&rows, &labels, 3).unwrap();

        assert!(model.predict_probability(&fixtures::scam_row()) > 0.5);
        assert!(model.predict_probability(&fixtures::legit_row()) < 0.5);
        assert!(model.validate(3).is_ok());
    }

    #[test]
    fn test_zero_vector_falls_back_to_priors() {
        let rows = vec![
            SparseVector::from_pairs(vec![(0, 1.0)]),
            SparseVector::from_pairs(vec![(0, 1.0)]),
            SparseVector::from_pairs(vec![(1, 1.0)]),
        ];
        let mut model = NaiveBayes::new(NaiveBayesConfig::default());
        model.fit(&rows, &[true, true, false], 2).unwrap();

        let p = model.predict_probability(&SparseVector::default());
        assert!((p - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_untrained_predicts_zero_and_fails_validation() {
        let model = NaiveBayes::new(NaiveBayesConfig::default());
        assert_eq!(model.predict_probability(&fixtures::scam_row()), 0.0);
        assert!(model.validate(3).is_err());
    }

    #[test]
    fn test_feature_count_mismatch_detected() {
        let (rows, labels) = fixtures::separable();
        let mut model = NaiveBayes::new(NaiveBayesConfig::default());
        model.fit(&rows, &labels, 3).unwrap();
        assert!(matches!(model.validate(4), Err(Error::Model(_))));
    }

    #[test]
    fn test_invalid_alpha() {
        let (rows, labels) = fixtures::separable();
        let mut model = NaiveBayes::new(NaiveBayesConfig { alpha: 0.0 });
        assert!(model.fit(&rows, &labels, 3).is_err());
    }
}
