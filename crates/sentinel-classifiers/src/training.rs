//! Training data: the built-in canonical corpus and dataset files

use serde::{Deserialize, Serialize};
use sentinel_core::{Error, Result};
use std::path::Path;

/// Canonical corpus: five legitimate messages followed by five each of
/// phishing, financial fraud, impersonation, urgency, and tech support
const CANONICAL_MESSAGES: &[(&str, bool)] = &[
    ("Hi, can we schedule a meeting tomorrow at 2 PM?", false),
    ("Your order has been shipped and will arrive in 3-5 business days", false),
    ("The project deadline is next Friday. Please submit your report", false),
    ("Weather looks nice today, let's have lunch together", false),
    ("Here's the report you requested. Please review and provide feedback", false),
    ("Urgent! Verify your account immediately by clicking here: bit.ly/verify", true),
    ("Your bank account has been compromised. Confirm your password now", true),
    ("URGENT: Click to confirm your identity and update payment information", true),
    ("Your account will be deleted in 24 hours. Act now!", true),
    ("Suspicious activity detected. Verify your information immediately", true),
    ("Congratulations! You've won $1,000,000! Claim your prize here", true),
    ("Make $5000/week from home! Easy money, no experience needed", true),
    ("Western Union money transfer - Send $500 and receive $10,000 back", true),
    ("Tax refund ready! Claim your $2,500 refund now at taxrefund.info", true),
    ("Bitcoin millionaire club - Invest $100 and earn $10,000 daily", true),
    ("Hi, it's your bank manager. Please confirm your account details", true),
    ("Amazon Security: Your account access is restricted. Verify details", true),
    ("PayPal Alert: Unusual activity. Contact us immediately", true),
    ("IRS Notice: You have unpaid taxes. Payment required immediately", true),
    ("Apple ID Security: Your account was used in China. Verify now", true),
    ("FINAL NOTICE! This is your last chance!!!", true),
    ("ACT NOW - Limited offer expires in 2 hours!!!", true),
    ("EXCLUSIVE DEAL - Only available today! DO NOT MISS OUT!", true),
    ("Your membership expires tomorrow - RENEW NOW to keep access", true),
    ("Emergency: Your credit card has been compromised - CALL US NOW", true),
    ("Your computer has a virus! Download our antivirus now: badsite.com", true),
    ("Tech Support Alert: System malfunction detected. Call 1-800-XXX-XXXX", true),
    ("ERROR: Your device is infected. Click here to clean it", true),
    ("Warning: Microsoft detected illegal files. Contact support immediately", true),
    ("Browser notification: Your PC has been compromised", true),
];

/// Parallel lists of messages and labels (true = scam)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSet {
    pub messages: Vec<String>,
    pub labels: Vec<bool>,
}

impl TrainingSet {
    /// The built-in 30-message corpus
    pub fn canonical() -> Self {
        let (messages, labels) = CANONICAL_MESSAGES
            .iter()
            .map(|(message, label)| (message.to_string(), *label))
            .unzip();
        Self { messages, labels }
    }

    /// Load a dataset file; `.yaml`/`.yml` is parsed as YAML, anything else
    /// as JSON. Labels may be booleans or 0/1.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        let raw: RawTrainingSet = if is_yaml {
            serde_yaml::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid dataset {}: {}", path.display(), e)))?
        } else {
            serde_json::from_str(&content)?
        };

        let set = Self {
            messages: raw.messages,
            labels: raw.labels.into_iter().map(Label::is_scam).collect(),
        };
        set.validate()?;
        Ok(set)
    }

    pub fn validate(&self) -> Result<()> {
        if self.messages.len() != self.labels.len() {
            return Err(Error::training(format!(
                "Dataset has {} messages but {} labels",
                self.messages.len(),
                self.labels.len()
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn scam_count(&self) -> usize {
        self.labels.iter().filter(|l| **l).count()
    }
}

#[derive(Deserialize)]
struct RawTrainingSet {
    messages: Vec<String>,
    labels: Vec<Label>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Label {
    Flag(bool),
    Numeric(u8),
}

impl Label {
    fn is_scam(self) -> bool {
        match self {
            Label::Flag(flag) => flag,
            Label::Numeric(n) => n != 0,
        }
    }
}
