//! Human-readable explanation of a verdict

use crate::keywords::{EXPLANATION_FINANCIAL_KEYWORDS, EXPLANATION_PRESSURE_KEYWORDS};
use crate::patterns::KeywordMatcher;
use sentinel_core::{Result, ScamCategory};

const VERY_HIGH_CONFIDENCE: f64 = 0.85;
const EXCLAMATION_LIMIT: usize = 2;
const CAPITALIZATION_LIMIT: usize = 2;

#[derive(Debug, Clone)]
pub struct ExplanationGenerator {
    pressure: KeywordMatcher,
    financial: KeywordMatcher,
}

impl ExplanationGenerator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pressure: KeywordMatcher::new(EXPLANATION_PRESSURE_KEYWORDS)?,
            financial: KeywordMatcher::new(EXPLANATION_FINANCIAL_KEYWORDS)?,
        })
    }

    pub fn explain(
        &self,
        message: &str,
        is_scam: bool,
        confidence: f64,
        category: ScamCategory,
    ) -> String {
        if !is_scam {
            return format!(
                "This message appears to be legitimate with {:.1}% confidence based on language patterns, sender characteristics, and content analysis.",
                (1.0 - confidence) * 100.0
            );
        }

        let percent = confidence * 100.0;
        let mut reasons = Vec::new();

        if confidence > VERY_HIGH_CONFIDENCE {
            reasons.push(format!(
                "Very high confidence ({:.1}%) - Multiple scam indicators detected",
                percent
            ));
        } else {
            reasons.push(format!(
                "Moderate to high confidence ({:.1}%) - Several suspicious patterns found",
                percent
            ));
        }

        if message.matches('!').count() > EXCLAMATION_LIMIT {
            reasons.push("Excessive exclamation marks indicating urgency or manipulation".to_string());
        }

        if self.pressure.is_match(message) {
            reasons.push("Pressure tactics with time-sensitive language".to_string());
        }

        if self.financial.is_match(message) {
            reasons.push("Financial request or payment involvement".to_string());
        }

        // Empty messages have no first word and skip this check
        if let Some(first_word) = message.split_whitespace().next() {
            let shouted = first_word.to_uppercase();
            if message.matches(shouted.as_str()).count() > CAPITALIZATION_LIMIT {
                reasons.push("Unusual capitalization patterns".to_string());
            }
        }

        format!(
            "Detected as {} ({:.1}% confidence). {}",
            category.display_name(),
            percent,
            reasons.join("; ")
        )
    }
}
