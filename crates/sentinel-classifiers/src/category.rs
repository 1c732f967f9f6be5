//! Keyword cascade assigning a scam category
//!
//! Runs on the raw message independently of the ensemble verdict. Rules are
//! evaluated in order and the first rule with any keyword present wins.

use crate::keywords::CATEGORY_CASCADE;
use crate::patterns::KeywordMatcher;
use serde::{Deserialize, Serialize};
use sentinel_core::{Error, Result, ScamCategory, SCAM_THRESHOLD};

/// One cascade step: a category and the keywords that trigger it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: ScamCategory,
    pub keywords: Vec<String>,
}

/// The built-in cascade
pub fn default_rules() -> Vec<CategoryRule> {
    CATEGORY_CASCADE
        .iter()
        .map(|(category, keywords)| CategoryRule {
            category: *category,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    rules: Vec<(ScamCategory, KeywordMatcher)>,
}

impl CategoryClassifier {
    pub fn new(rules: &[CategoryRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                if rule.keywords.iter().any(|k| k.trim().is_empty()) {
                    return Err(Error::config(format!(
                        "Category rule {} has an empty keyword",
                        rule.category
                    )));
                }
                Ok((rule.category, KeywordMatcher::new(&rule.keywords)?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// First matching rule, else financial fraud for high-confidence
    /// messages, else unknown
    pub fn classify(&self, message: &str, confidence: f64) -> ScamCategory {
        self.rules
            .iter()
            .find(|(_, matcher)| matcher.is_match(message))
            .map(|(category, _)| *category)
            .unwrap_or(if confidence > SCAM_THRESHOLD {
                ScamCategory::FinancialFraud
            } else {
                ScamCategory::Unknown
            })
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
