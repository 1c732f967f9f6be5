//! Text normalization for the statistical vectorizer
//!
//! The rule-based category cascade reads raw text and never goes through
//! this module.

use crate::config::NormalizerConfig;
use crate::keywords::STOPWORDS;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use sentinel_core::Result;
use std::collections::HashSet;

/// Cleans, tokenizes, lemmatizes, and filters message text
pub struct TextNormalizer {
    config: NormalizerConfig,
    url_regex: Regex,
    email_regex: Regex,
    html_regex: Regex,
    mention_regex: Regex,
    digit_regex: Regex,
    non_letter_regex: Regex,
    whitespace_regex: Regex,
    stemmer: Stemmer,
    stopwords: HashSet<String>,
}

impl std::fmt::Debug for TextNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextNormalizer")
            .field("config", &self.config)
            .field("stopwords", &self.stopwords.len())
            .finish()
    }
}

impl TextNormalizer {
    /// Create a normalizer with the given toggles
    pub fn new(config: NormalizerConfig) -> Result<Self> {
        let stemmer = Stemmer::create(Algorithm::English);

        // Punctuation is stripped before stopword filtering, so "don't" must
        // also be known as "dont"; with lemmatization on, stems are included
        let mut stopwords = HashSet::new();
        for word in STOPWORDS {
            let bare: String = word.chars().filter(|c| *c != '\'').collect();
            for form in [word.to_string(), bare] {
                if config.lemmatize {
                    stopwords.insert(stemmer.stem(&form).into_owned());
                }
                stopwords.insert(form);
            }
        }

        Ok(Self {
            config,
            url_regex: compile(r"http\S+|www\S+")?,
            email_regex: compile(r"\S+@\S+")?,
            html_regex: compile(r"<.*?>")?,
            mention_regex: compile(r"[@#]\w+")?,
            digit_regex: compile(r"\d+")?,
            non_letter_regex: compile(r"[^\p{L}\s]")?,
            whitespace_regex: compile(r"\s+")?,
            stemmer,
            stopwords,
        })
    }

    /// Lowercase and strip URLs, emails, markup, mentions, digits, and
    /// punctuation, leaving single-spaced words
    pub fn clean(&self, text: &str) -> String {
        let text = text.to_lowercase();
        let text = self.url_regex.replace_all(&text, "");
        let text = self.email_regex.replace_all(&text, "");
        let text = self.html_regex.replace_all(&text, "");
        let text = self.mention_regex.replace_all(&text, "");
        let text = self.digit_regex.replace_all(&text, "");
        let text = self.non_letter_regex.replace_all(&text, "");
        self.whitespace_regex.replace_all(&text, " ").trim().to_string()
    }

    /// Full pipeline: clean, split, lemmatize, drop stopwords and empties
    pub fn normalize(&self, text: &str) -> Vec<String> {
        self.clean(text)
            .split(' ')
            .map(|token| {
                if self.config.lemmatize {
                    self.stemmer.stem(token).into_owned()
                } else {
                    token.to_string()
                }
            })
            .filter(|token| !(self.config.remove_stopwords && self.stopwords.contains(token)))
            .filter(|token| !token.is_empty())
            .collect()
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        sentinel_core::Error::config(format!("Failed to compile normalizer regex: {}", e))
    })
}
