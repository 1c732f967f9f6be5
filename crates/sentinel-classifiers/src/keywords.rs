//! Static keyword tables
//!
//! Every list here is configuration data consumed by the feature extractor,
//! the category cascade, and the explanation generator. Control flow never
//! names an individual keyword.

use sentinel_core::ScamCategory;

/// Time-pressure vocabulary scored by the feature extractor
pub const URGENCY_KEYWORDS: &[&str] = &[
    "urgent",
    "immediate",
    "act now",
    "immediately",
    "expires",
    "limited",
    "hurry",
    "asap",
    "quickly",
    "time sensitive",
    "deadline",
    "exclusive",
    "final",
    "last chance",
    "must act",
    "don't wait",
    "verify",
    "confirm",
];

/// Money and payment vocabulary scored by the feature extractor
pub const FINANCIAL_KEYWORDS: &[&str] = &[
    "money",
    "dollars",
    "cash",
    "payment",
    "credit card",
    "bank",
    "account",
    "transfer",
    "wire",
    "bitcoin",
    "crypto",
    "prize",
    "award",
    "inheritance",
    "tax refund",
    "roi",
    "investment",
    "profit",
    "claim",
    "million",
    "thousand",
];

/// Brands and authority titles commonly impersonated
pub const IMPERSONATION_KEYWORDS: &[&str] = &[
    "bank",
    "amazon",
    "apple",
    "google",
    "microsoft",
    "paypal",
    "ebay",
    "ceo",
    "agent",
    "officer",
    "support",
    "admin",
    "manager",
    "director",
    "executive",
    "company",
    "official",
];

/// Saturation constants: a keyword score reaches 1.0 at this many matches
pub const URGENCY_NORMALIZER: f64 = 5.0;
pub const FINANCIAL_NORMALIZER: f64 = 5.0;
pub const IMPERSONATION_NORMALIZER: f64 = 3.0;

/// Common misspellings (misspelled, correct)
pub const MISSPELLINGS: &[(&str, &str)] = &[
    ("recieve", "receive"),
    ("occured", "occurred"),
    ("seperate", "separate"),
    ("definately", "definitely"),
    ("wich", "which"),
    ("lenght", "length"),
];

/// Category cascade, evaluated top to bottom, first match wins
pub const CATEGORY_CASCADE: &[(ScamCategory, &[&str])] = &[
    (
        ScamCategory::Phishing,
        &["verify", "confirm", "login", "password", "account"],
    ),
    (
        ScamCategory::FinancialFraud,
        &["money", "payment", "bank", "transfer", "invoice"],
    ),
    (
        ScamCategory::Impersonation,
        &["ceo", "manager", "director", "officer", "agent"],
    ),
    (
        ScamCategory::Cryptocurrency,
        &["bitcoin", "crypto", "wallet", "blockchain"],
    ),
    (
        ScamCategory::LotteryPrize,
        &["congratulations", "won", "prize", "winner", "claim"],
    ),
    (
        ScamCategory::JobOffer,
        &["hire", "job", "position", "employment", "salary"],
    ),
    (
        ScamCategory::PackageDelivery,
        &["package", "delivery", "shipment", "tracking"],
    ),
    (
        ScamCategory::Urgency,
        &["urgent", "immediate", "asap", "hurry", "expires"],
    ),
];

/// Pressure words called out by the explanation generator
pub const EXPLANATION_PRESSURE_KEYWORDS: &[&str] = &["urgent", "immediate", "asap"];

/// Payment words called out by the explanation generator
pub const EXPLANATION_FINANCIAL_KEYWORDS: &[&str] = &["money", "payment", "bank", "transfer"];

/// English stopwords removed by the text normalizer
pub const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];
