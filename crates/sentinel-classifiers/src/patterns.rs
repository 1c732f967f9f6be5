//! Case-insensitive keyword matching built on Aho-Corasick

use aho_corasick::AhoCorasick;
use sentinel_core::Result;

/// Fast substring matcher over a fixed keyword list
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    automaton: AhoCorasick,
}

impl KeywordMatcher {
    /// Build a matcher; keywords and text are compared after Unicode lowercasing
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().to_lowercase())
            .collect();

        let automaton = AhoCorasick::new(&keywords).map_err(|e| {
            sentinel_core::Error::config(format!("Failed to build keyword matcher: {}", e))
        })?;

        Ok(Self { automaton })
    }

    /// True when any keyword occurs anywhere in the text
    pub fn is_match(&self, text: &str) -> bool {
        self.automaton.is_match(&text.to_lowercase())
    }

    /// Number of distinct keywords present; repeats of one keyword count once
    pub fn distinct_matches(&self, text: &str) -> usize {
        let mut present = vec![false; self.automaton.patterns_len()];
        // Overlapping: "immediate" inside "immediately" must register both
        for m in self.automaton.find_overlapping_iter(&text.to_lowercase()) {
            present[m.pattern().as_usize()] = true;
        }
        present.iter().filter(|hit| **hit).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_matcher() {
        let matcher = KeywordMatcher::new(["money", "bank", "transfer"]).unwrap();

        assert!(!matcher.is_match("this is clean text"));
        assert!(matcher.is_match("Send MONEY to the Bank"));
        assert_eq!(matcher.distinct_matches("money money money"), 1);
        assert_eq!(matcher.distinct_matches("bank transfer of money"), 3);
        assert_eq!(matcher.distinct_matches("wire TRANSFER via Bank"), 2);
    }

    #[test]
    fn test_matching_uses_unicode_lowercase() {
        let matcher = KeywordMatcher::new(["bank"]).unwrap();
        // U+212A KELVIN SIGN lowercases to ASCII 'k'
        assert!(matcher.is_match("Send to my BAN\u{212A} now"));
        assert_eq!(matcher.distinct_matches("BAN\u{212A}"), 1);
    }

    #[test]
    fn test_overlapping_keywords_both_count() {
        let matcher = KeywordMatcher::new(["immediate", "immediately"]).unwrap();
        assert_eq!(matcher.distinct_matches("reply immediately"), 2);
    }

    #[test]
    fn test_empty_keyword_list() {
        let matcher = KeywordMatcher::new(Vec::<String>::new()).unwrap();
        assert!(!matcher.is_match("anything"));
        assert_eq!(matcher.distinct_matches("anything"), 0);
    }
}
