//! Weighted ensemble aggregation

use serde::{Deserialize, Serialize};
use sentinel_core::{Error, ModelScores, Result, RiskLevel, SCAM_THRESHOLD};

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Per-model weights; each non-negative, summing to 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleWeights {
    #[serde(default = "default_naive_bayes")]
    pub naive_bayes: f64,

    #[serde(default = "default_random_forest")]
    pub random_forest: f64,

    #[serde(default = "default_gradient_boosting")]
    pub gradient_boosting: f64,
}

fn default_naive_bayes() -> f64 {
    0.25
}

fn default_random_forest() -> f64 {
    0.35
}

fn default_gradient_boosting() -> f64 {
    0.40
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            naive_bayes: default_naive_bayes(),
            random_forest: default_random_forest(),
            gradient_boosting: default_gradient_boosting(),
        }
    }
}

impl EnsembleWeights {
    pub fn validate(&self) -> Result<()> {
        let weights = [self.naive_bayes, self.random_forest, self.gradient_boosting];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::config(format!(
                "Ensemble weights must be finite and non-negative: {:?}",
                self
            )));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(Error::config(format!(
                "Ensemble weights must sum to 1.0, got {}",
                sum
            )));
        }
        Ok(())
    }

    /// Weighted confidence, clamped to [0, 1]
    pub fn combine(&self, scores: &ModelScores) -> f64 {
        let confidence = self.naive_bayes * scores.naive_bayes
            + self.random_forest * scores.random_forest
            + self.gradient_boosting * scores.gradient_boosting;
        confidence.clamp(0.0, 1.0)
    }
}

/// Ensemble decision before category and explanation are attached
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub confidence: f64,
    pub is_scam: bool,
    pub risk_level: RiskLevel,
}

impl Verdict {
    pub fn from_confidence(confidence: f64) -> Self {
        Self {
            confidence,
            is_scam: confidence > SCAM_THRESHOLD,
            risk_level: RiskLevel::from_confidence(confidence),
        }
    }
}

pub fn aggregate(scores: &ModelScores, weights: &EnsembleWeights) -> Verdict {
    Verdict::from_confidence(weights.combine(scores))
}
