//! Sentinel Core
//!
//! Core types and error handling shared across Sentinel components.
//!
//! This crate provides:
//! - The detection result record and its parts (features, per-model scores)
//! - The closed scam category and risk tier enums
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    DetectionResult, FeatureSet, ModelScores, RiskLevel, ScamCategory, SCAM_THRESHOLD,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{DetectionResult, FeatureSet, ModelScores, RiskLevel, ScamCategory};
}
