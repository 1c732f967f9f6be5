//! Core types for Sentinel

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Verdict threshold: confidence must be strictly greater to flag a scam
pub const SCAM_THRESHOLD: f64 = 0.5;

/// Scam sub-category assigned by the keyword cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScamCategory {
    Phishing,
    FinancialFraud,
    Impersonation,
    TechSupport,
    LotteryPrize,
    Romantic,
    JobOffer,
    PackageDelivery,
    Urgency,
    Cryptocurrency,
    Unknown,
}

impl ScamCategory {
    /// Every category, `Unknown` last
    pub const ALL: [ScamCategory; 11] = [
        Self::Phishing,
        Self::FinancialFraud,
        Self::Impersonation,
        Self::TechSupport,
        Self::LotteryPrize,
        Self::Romantic,
        Self::JobOffer,
        Self::PackageDelivery,
        Self::Urgency,
        Self::Cryptocurrency,
        Self::Unknown,
    ];

    /// Wire label (snake_case)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Phishing => "phishing",
            Self::FinancialFraud => "financial_fraud",
            Self::Impersonation => "impersonation",
            Self::TechSupport => "tech_support",
            Self::LotteryPrize => "lottery_prize",
            Self::Romantic => "romantic",
            Self::JobOffer => "job_offer",
            Self::PackageDelivery => "package_delivery",
            Self::Urgency => "urgency",
            Self::Cryptocurrency => "cryptocurrency",
            Self::Unknown => "unknown",
        }
    }

    /// Label with underscores replaced by spaces, for prose
    pub fn display_name(&self) -> String {
        self.label().replace('_', " ")
    }

    /// Human-readable description shown by the analytics endpoint
    pub fn description(&self) -> &'static str {
        match self {
            Self::Phishing => "Phishing - Fake login or credential harvesting",
            Self::FinancialFraud => "Financial Fraud - Fake investments or money transfers",
            Self::Impersonation => "Impersonation - Fake authority or CEO fraud",
            Self::TechSupport => "Tech Support - Fake support or malware distribution",
            Self::LotteryPrize => "Lottery/Prize - Fake winnings or claims",
            Self::Romantic => "Romantic - Romance scams or catfishing",
            Self::JobOffer => "Job Offer - Fake employment opportunities",
            Self::PackageDelivery => "Package - Fake shipment notifications",
            Self::Urgency => "Urgency - Time pressure manipulation",
            Self::Cryptocurrency => "Cryptocurrency - Fake crypto offers",
            Self::Unknown => "Unknown - No recognizable scam pattern",
        }
    }

    /// Position in [`ScamCategory::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ScamCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ScamCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.label() == s)
            .ok_or_else(|| format!("unknown scam category: {}", s))
    }
}

/// Coarse severity band derived from the ensemble confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
    /// Only produced when no model is trained
    Unknown,
}

impl RiskLevel {
    /// Map a confidence to a tier, thresholds evaluated high to low.
    ///
    /// The medium tier starts at exactly 0.50 while the verdict requires
    /// confidence strictly above 0.50, so a message at 0.50 is legitimate
    /// but medium risk.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.85 {
            Self::Critical
        } else if confidence >= 0.70 {
            Self::High
        } else if confidence >= 0.50 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Hand-crafted signals extracted from the raw message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub message_length: usize,
    pub word_count: usize,
    pub avg_word_length: f64,
    pub uppercase_ratio: f64,
    pub digit_ratio: f64,
    pub exclamation_count: usize,
    pub question_mark_count: usize,
    pub ellipsis_count: usize,
    pub suspicious_links: usize,
    pub email_count: usize,
    pub urgency_score: f64,
    pub urgency_count: usize,
    pub financial_score: f64,
    pub financial_count: usize,
    pub impersonation_score: f64,
    pub impersonation_count: usize,
    pub misspelling_count: usize,
    pub misspelling_ratio: f64,
    pub has_all_caps_words: f64,
    pub special_char_count: usize,
}

/// Per-model scam probabilities
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelScores {
    pub naive_bayes: f64,
    pub random_forest: f64,
    pub gradient_boosting: f64,
}

/// Output of a single detection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    pub is_scam: bool,

    /// Weighted ensemble confidence in [0, 1]
    pub confidence: f64,

    pub scam_type: ScamCategory,

    pub risk_level: RiskLevel,

    /// Extracted features, `{}` when no model is trained
    #[serde(serialize_with = "empty_map_if_none")]
    pub features: Option<FeatureSet>,

    /// Per-model scores, `{}` when no model is trained
    #[serde(serialize_with = "empty_map_if_none")]
    pub confidence_breakdown: Option<ModelScores>,

    pub explanation: String,
}

impl DetectionResult {
    /// Explanation reported before any model has been trained
    pub const UNTRAINED_EXPLANATION: &'static str = "model not trained";

    /// Degraded result returned while the detector is untrained
    pub fn untrained() -> Self {
        Self {
            is_scam: false,
            confidence: 0.0,
            scam_type: ScamCategory::Unknown,
            risk_level: RiskLevel::Unknown,
            features: None,
            confidence_breakdown: None,
            explanation: Self::UNTRAINED_EXPLANATION.to_string(),
        }
    }
}

fn empty_map_if_none<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(v) => v.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}
