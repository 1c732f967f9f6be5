//! Service configuration

use sentinel_classifiers::DetectorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// HTTP service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Saved model bundle
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Train on the canonical corpus and save when no bundle exists
    #[serde(default)]
    pub train_if_missing: bool,

    #[serde(default)]
    pub cors: CorsConfig,

    #[serde(default)]
    pub limits: InputLimits,

    #[serde(default)]
    pub detector: DetectorConfig,
}

impl ServiceConfig {
    /// Load configuration from a YAML file, or defaults when it is absent
    pub fn load(config_path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_path = config_path.as_ref();
        let config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content).map_err(|e| {
                anyhow::anyhow!("Invalid configuration {}: {}", config_path.display(), e)
            })?
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.detector.validate()?;
        self.limits.validate()?;
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            model_path: default_model_path(),
            train_if_missing: false,
            cors: CorsConfig::default(),
            limits: InputLimits::default(),
            detector: DetectorConfig::default(),
        }
    }
}

/// Cross-origin policy for the `/api` routes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; empty allows any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Request validation limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputLimits {
    /// Minimum message length in characters, after trimming
    #[serde(default = "default_min_message_chars")]
    pub min_message_chars: usize,

    /// Maximum message length in characters
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,

    /// Maximum number of messages per batch request
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

impl InputLimits {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.min_message_chars > self.max_message_chars {
            anyhow::bail!(
                "min_message_chars ({}) exceeds max_message_chars ({})",
                self.min_message_chars,
                self.max_message_chars
            );
        }
        if self.max_batch_size == 0 {
            anyhow::bail!("max_batch_size must be at least 1");
        }
        Ok(())
    }
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            min_message_chars: default_min_message_chars(),
            max_message_chars: default_max_message_chars(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/scam_detector.json")
}

fn default_min_message_chars() -> usize {
    3
}

fn default_max_message_chars() -> usize {
    5000
}

fn default_max_batch_size() -> usize {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = ServiceConfig::load("/nonexistent/sentinel.yaml").unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.limits.max_message_chars, 5000);
        assert_eq!(config.limits.max_batch_size, 1000);
        assert!(config.cors.allowed_origins.is_empty());
        assert!(!config.train_if_missing);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sentinel.yaml");
        std::fs::write(
            &path,
            "port: 9000\ncors:\n  allowed_origins: [\"https://app.example\"]\nlimits:\n  max_batch_size: 10\n",
        )
        .unwrap();

        let config = ServiceConfig::load(&path).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.listen, "0.0.0.0");
        assert_eq!(config.cors.allowed_origins, vec!["https://app.example"]);
        assert_eq!(config.limits.max_batch_size, 10);
        assert_eq!(config.limits.min_message_chars, 3);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sentinel.yaml");
        std::fs::write(
            &path,
            "detector:\n  weights:\n    naive_bayes: 0.5\n    random_forest: 0.5\n    gradient_boosting: 0.5\n",
        )
        .unwrap();

        assert!(ServiceConfig::load(&path).is_err());
    }

    #[test]
    fn test_inverted_limits_rejected() {
        let limits = InputLimits {
            min_message_chars: 10,
            max_message_chars: 5,
            max_batch_size: 1,
        };
        assert!(limits.validate().is_err());
    }
}
