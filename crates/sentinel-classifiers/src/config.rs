//! Configuration for the detector pipeline

use crate::category::{default_rules, CategoryRule};
use crate::ensemble::EnsembleWeights;
use crate::models::{GradientBoostConfig, NaiveBayesConfig, RandomForestConfig};
use crate::vectorizer::VectorizerConfig;
use serde::{Deserialize, Serialize};
use sentinel_core::{Error, Result};
use std::path::Path;

/// Text normalizer toggles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Reduce tokens to their stems
    #[serde(default = "default_true")]
    pub lemmatize: bool,

    /// Drop English stopwords
    #[serde(default = "default_true")]
    pub remove_stopwords: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            lemmatize: true,
            remove_stopwords: true,
        }
    }
}

/// Everything needed to build and train a detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    #[serde(default)]
    pub normalizer: NormalizerConfig,

    #[serde(default)]
    pub vectorizer: VectorizerConfig,

    #[serde(default)]
    pub naive_bayes: NaiveBayesConfig,

    #[serde(default)]
    pub random_forest: RandomForestConfig,

    #[serde(default)]
    pub gradient_boosting: GradientBoostConfig,

    /// Ensemble weights; must sum to 1.0
    #[serde(default)]
    pub weights: EnsembleWeights,

    /// Category cascade, first match wins
    #[serde(default = "default_rules")]
    pub category_rules: Vec<CategoryRule>,

    /// Batch detection logs progress every this many messages
    #[serde(default = "default_batch_log_interval")]
    pub batch_log_interval: usize,
}

fn default_true() -> bool {
    true
}

fn default_batch_log_interval() -> usize {
    100
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            normalizer: NormalizerConfig::default(),
            vectorizer: VectorizerConfig::default(),
            naive_bayes: NaiveBayesConfig::default(),
            random_forest: RandomForestConfig::default(),
            gradient_boosting: GradientBoostConfig::default(),
            weights: EnsembleWeights::default(),
            category_rules: default_rules(),
            batch_log_interval: default_batch_log_interval(),
        }
    }
}

impl DetectorConfig {
    /// Parse configuration from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Invalid detector config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.vectorizer.validate()?;
        if self.batch_log_interval == 0 {
            return Err(Error::config("batch_log_interval must be at least 1"));
        }
        Ok(())
    }
}
