//! Sentinel Classifiers
//!
//! Scam detection for short text messages.
//!
//! Two independent decision paths run on every message:
//! - Statistical: normalized text is TF-IDF vectorized and scored by naive
//!   Bayes, a random forest, and gradient-boosted trees; a weighted average
//!   yields the verdict and risk tier
//! - Rule-based: a keyword cascade on the raw text assigns the scam category
//!
//! Hand-crafted features are extracted alongside as reporting metadata.

pub mod category;
pub mod config;
pub mod detector;
pub mod ensemble;
pub mod explanation;
pub mod features;
pub mod keywords;
pub mod models;
pub mod normalizer;
pub mod patterns;
pub mod training;
pub mod vectorizer;

pub use category::{default_rules, CategoryClassifier, CategoryRule};
pub use config::{DetectorConfig, NormalizerConfig};
pub use detector::{
    EvaluationReport, ModelInfo, ScamDetector, TrainingSummary, MODEL_FORMAT_VERSION,
};
pub use ensemble::{aggregate, EnsembleWeights, Verdict};
pub use explanation::ExplanationGenerator;
pub use features::FeatureExtractor;
pub use models::ScamModel;
pub use normalizer::TextNormalizer;
pub use patterns::KeywordMatcher;
pub use training::TrainingSet;
pub use vectorizer::{SparseVector, TfIdfVectorizer, VectorizerConfig};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::DetectorConfig;
    pub use crate::detector::ScamDetector;
    pub use crate::training::TrainingSet;
    pub use sentinel_core::prelude::*;
}
