//! Hand-crafted message features
//!
//! Features are metadata reported alongside a detection; the statistical
//! ensemble never consumes them. Extraction is total: every string,
//! including the empty one, yields a well-formed [`FeatureSet`].

use crate::keywords::{
    FINANCIAL_KEYWORDS, FINANCIAL_NORMALIZER, IMPERSONATION_KEYWORDS, IMPERSONATION_NORMALIZER,
    MISSPELLINGS, URGENCY_KEYWORDS, URGENCY_NORMALIZER,
};
use crate::patterns::KeywordMatcher;
use regex::Regex;
use sentinel_core::{FeatureSet, Result};
use std::collections::HashSet;

/// Extracts a [`FeatureSet`] from raw message text
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    urgency: KeywordMatcher,
    financial: KeywordMatcher,
    impersonation: KeywordMatcher,
    link_regex: Regex,
    email_regex: Regex,
    misspellings: HashSet<&'static str>,
}

impl FeatureExtractor {
    /// Create an extractor over the built-in keyword tables
    pub fn new() -> Result<Self> {
        Ok(Self {
            urgency: KeywordMatcher::new(URGENCY_KEYWORDS)?,
            financial: KeywordMatcher::new(FINANCIAL_KEYWORDS)?,
            impersonation: KeywordMatcher::new(IMPERSONATION_KEYWORDS)?,
            link_regex: Regex::new(r"http\S+|www\S+").map_err(|e| {
                sentinel_core::Error::config(format!("Failed to compile link regex: {}", e))
            })?,
            email_regex: Regex::new(r"\S+@\S+").map_err(|e| {
                sentinel_core::Error::config(format!("Failed to compile email regex: {}", e))
            })?,
            misspellings: MISSPELLINGS.iter().map(|(wrong, _)| *wrong).collect(),
        })
    }

    /// Extract every feature from the message
    pub fn extract(&self, text: &str) -> FeatureSet {
        let length = text.chars().count();
        let denominator = length.max(1) as f64;
        let words: Vec<&str> = text.split_whitespace().collect();

        let uppercase = text.chars().filter(|c| c.is_uppercase()).count();
        let digits = text.chars().filter(|c| c.is_numeric()).count();

        let avg_word_length = if words.is_empty() {
            0.0
        } else {
            words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / words.len() as f64
        };

        let urgency_count = self.urgency.distinct_matches(text);
        let financial_count = self.financial.distinct_matches(text);
        let impersonation_count = self.impersonation.distinct_matches(text);

        let misspelling_count = words
            .iter()
            .map(|w| w.trim_matches(|c: char| !c.is_alphabetic()).to_lowercase())
            .filter(|w| self.misspellings.contains(w.as_str()))
            .count();

        FeatureSet {
            message_length: length,
            word_count: words.len(),
            avg_word_length,
            uppercase_ratio: uppercase as f64 / denominator,
            digit_ratio: digits as f64 / denominator,
            exclamation_count: text.matches('!').count(),
            question_mark_count: text.matches('?').count(),
            ellipsis_count: text.matches("...").count(),
            suspicious_links: self.link_regex.find_iter(text).count(),
            email_count: self.email_regex.find_iter(text).count(),
            urgency_score: saturating_score(urgency_count, URGENCY_NORMALIZER),
            urgency_count,
            financial_score: saturating_score(financial_count, FINANCIAL_NORMALIZER),
            financial_count,
            impersonation_score: saturating_score(impersonation_count, IMPERSONATION_NORMALIZER),
            impersonation_count,
            misspelling_count,
            misspelling_ratio: misspelling_count as f64 / words.len().max(1) as f64,
            has_all_caps_words: if words.iter().any(|w| is_shouting(w)) {
                1.0
            } else {
                0.0
            },
            special_char_count: text.chars().filter(|c| c.is_ascii_punctuation()).count(),
        }
    }
}

/// Keyword score capped at 1.0 however many keywords hit
fn saturating_score(matches: usize, normalizer: f64) -> f64 {
    (matches as f64 / normalizer).min(1.0)
}

/// Multi-character word whose cased letters are all uppercase
fn is_shouting(word: &str) -> bool {
    word.chars().count() > 1
        && word.chars().any(|c| c.is_uppercase())
        && !word.chars().any(|c| c.is_lowercase())
}
