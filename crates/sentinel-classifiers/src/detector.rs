//! Scam detector orchestrating features, ensemble, cascade, and explanation

use crate::category::CategoryClassifier;
use crate::config::{DetectorConfig, NormalizerConfig};
use crate::ensemble::{aggregate, EnsembleWeights};
use crate::explanation::ExplanationGenerator;
use crate::features::FeatureExtractor;
use crate::models::{GradientBoost, NaiveBayes, RandomForest, ScamModel};
use crate::normalizer::TextNormalizer;
use crate::vectorizer::{SparseVector, TfIdfVectorizer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sentinel_core::{DetectionResult, Error, ModelScores, Result, SCAM_THRESHOLD};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Version written into every saved bundle; loading rejects other versions
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Facts recorded about the last successful training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub samples: usize,
    pub scam_count: usize,
    pub legitimate_count: usize,
    pub vocabulary_size: usize,
    pub trained_at: DateTime<Utc>,
}

/// Verdict accuracy against known labels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

/// Read-only description of the loaded model, for analytics
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub is_trained: bool,
    pub models: Vec<String>,
    pub weights: EnsembleWeights,
    pub vocabulary_size: Option<usize>,
    pub training: Option<TrainingSummary>,
}

/// Fitted vectorizer and models; replaced as a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TrainedEnsemble {
    weights: EnsembleWeights,
    vectorizer: TfIdfVectorizer,
    naive_bayes: NaiveBayes,
    random_forest: RandomForest,
    gradient_boosting: GradientBoost,
    training: TrainingSummary,
}

impl TrainedEnsemble {
    fn score(&self, row: &SparseVector) -> ModelScores {
        ModelScores {
            naive_bayes: self.naive_bayes.predict_probability(row),
            random_forest: self.random_forest.predict_probability(row),
            gradient_boosting: self.gradient_boosting.predict_probability(row),
        }
    }

    fn members(&self) -> [&dyn ScamModel; 3] {
        [&self.naive_bayes, &self.random_forest, &self.gradient_boosting]
    }

    fn validate(&self) -> Result<()> {
        self.weights
            .validate()
            .map_err(|e| Error::model(format!("Bundle weights rejected: {}", e)))?;
        self.vectorizer.validate()?;
        let n_features = self.vectorizer.vocabulary_size();
        for model in self.members() {
            model.validate(n_features)?;
        }
        Ok(())
    }
}

/// On-disk model bundle
#[derive(Debug, Serialize, Deserialize)]
struct ModelBundle {
    format_version: u32,
    is_trained: bool,
    normalizer: NormalizerConfig,
    #[serde(flatten)]
    ensemble: TrainedEnsemble,
}

impl ModelBundle {
    fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let bundle: ModelBundle = serde_json::from_slice(&bytes)
            .map_err(|e| Error::model(format!("Corrupt model bundle {}: {}", path.display(), e)))?;

        if bundle.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::model(format!(
                "Unsupported model format version {} (expected {})",
                bundle.format_version, MODEL_FORMAT_VERSION
            )));
        }
        if !bundle.is_trained {
            return Err(Error::model("Model bundle is not trained"));
        }
        bundle.ensemble.validate()?;
        Ok(bundle)
    }
}

/// Scam detector
///
/// Untrained detectors answer every request with
/// [`DetectionResult::untrained`]. Training and loading replace the fitted
/// ensemble only after the new one is complete.
#[derive(Debug)]
pub struct ScamDetector {
    config: DetectorConfig,
    normalizer: TextNormalizer,
    extractor: FeatureExtractor,
    categorizer: CategoryClassifier,
    explainer: ExplanationGenerator,
    ensemble: Option<TrainedEnsemble>,
}

impl ScamDetector {
    /// Create an untrained detector
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            normalizer: TextNormalizer::new(config.normalizer.clone())?,
            extractor: FeatureExtractor::new()?,
            categorizer: CategoryClassifier::new(&config.category_rules)?,
            explainer: ExplanationGenerator::new()?,
            ensemble: None,
            config,
        })
    }

    /// Build a detector and load a saved bundle into it
    pub fn from_file(config: DetectorConfig, path: impl AsRef<Path>) -> Result<Self> {
        let mut detector = Self::new(config)?;
        detector.load(path)?;
        Ok(detector)
    }

    pub fn is_trained(&self) -> bool {
        self.ensemble.is_some()
    }

    /// Classify one message; never fails
    pub fn detect(&self, message: &str) -> DetectionResult {
        let Some(ensemble) = &self.ensemble else {
            return DetectionResult::untrained();
        };

        let features = self.extractor.extract(message);
        let tokens = self.normalizer.normalize(message);
        let row = ensemble.vectorizer.transform(&tokens);
        let scores = ensemble.score(&row);
        let verdict = aggregate(&scores, &ensemble.weights);
        let category = self.categorizer.classify(message, verdict.confidence);
        let explanation =
            self.explainer
                .explain(message, verdict.is_scam, verdict.confidence, category);

        debug!(
            "Detected is_scam={} confidence={:.4} category={}",
            verdict.is_scam, verdict.confidence, category
        );

        DetectionResult {
            is_scam: verdict.is_scam,
            confidence: verdict.confidence,
            scam_type: category,
            risk_level: verdict.risk_level,
            features: Some(features),
            confidence_breakdown: Some(scores),
            explanation,
        }
    }

    /// Classify many messages, one result per input in input order
    pub fn detect_batch<S: AsRef<str>>(&self, messages: &[S]) -> Vec<DetectionResult> {
        let interval = self.config.batch_log_interval.max(1);
        messages
            .iter()
            .enumerate()
            .map(|(i, message)| {
                let result = self.detect(message.as_ref());
                if (i + 1) % interval == 0 {
                    info!("Processed {}/{} messages", i + 1, messages.len());
                }
                result
            })
            .collect()
    }

    /// Fit a fresh ensemble; the previous one survives any error
    pub fn train<S: AsRef<str>>(&mut self, messages: &[S], labels: &[bool]) -> Result<TrainingSummary> {
        if messages.len() != labels.len() {
            return Err(Error::training(format!(
                "Got {} messages but {} labels",
                messages.len(),
                labels.len()
            )));
        }
        let scam_count = labels.iter().filter(|l| **l).count();
        let legitimate_count = labels.len() - scam_count;
        if scam_count == 0 || legitimate_count == 0 {
            return Err(Error::training(
                "Training data must contain both scam and legitimate examples",
            ));
        }

        info!(
            "Training scam detector on {} messages ({} scam, {} legitimate)",
            messages.len(),
            scam_count,
            legitimate_count
        );
        let started = Instant::now();

        let documents: Vec<Vec<String>> = messages
            .iter()
            .map(|m| self.normalizer.normalize(m.as_ref()))
            .collect();
        let vectorizer = TfIdfVectorizer::fit(self.config.vectorizer.clone(), &documents)?;
        let rows: Vec<SparseVector> = documents.iter().map(|d| vectorizer.transform(d)).collect();
        let n_features = vectorizer.vocabulary_size();

        let mut naive_bayes = NaiveBayes::new(self.config.naive_bayes.clone());
        let mut random_forest = RandomForest::new(self.config.random_forest.clone());
        let mut gradient_boosting = GradientBoost::new(self.config.gradient_boosting.clone());
        for model in [
            &mut naive_bayes as &mut dyn ScamModel,
            &mut random_forest,
            &mut gradient_boosting,
        ] {
            debug!("Fitting {}", model.name());
            model.fit(&rows, labels, n_features)?;
        }

        let training = TrainingSummary {
            samples: messages.len(),
            scam_count,
            legitimate_count,
            vocabulary_size: n_features,
            trained_at: Utc::now(),
        };

        self.ensemble = Some(TrainedEnsemble {
            weights: self.config.weights,
            vectorizer,
            naive_bayes,
            random_forest,
            gradient_boosting,
            training: training.clone(),
        });

        info!(
            "Training complete: {} terms in {:?}",
            n_features,
            started.elapsed()
        );
        Ok(training)
    }

    /// Accuracy of `confidence > 0.5` against the given labels
    pub fn evaluate<S: AsRef<str>>(&self, messages: &[S], labels: &[bool]) -> Result<EvaluationReport> {
        if !self.is_trained() {
            return Err(Error::model("Cannot evaluate an untrained detector"));
        }
        if messages.len() != labels.len() {
            return Err(Error::training(format!(
                "Got {} messages but {} labels",
                messages.len(),
                labels.len()
            )));
        }

        let mut report = EvaluationReport {
            total: messages.len(),
            correct: 0,
            accuracy: 0.0,
            true_positives: 0,
            false_positives: 0,
            true_negatives: 0,
            false_negatives: 0,
        };

        for (message, &label) in messages.iter().zip(labels) {
            let predicted = self.detect(message.as_ref()).confidence > SCAM_THRESHOLD;
            match (predicted, label) {
                (true, true) => report.true_positives += 1,
                (true, false) => report.false_positives += 1,
                (false, false) => report.true_negatives += 1,
                (false, true) => report.false_negatives += 1,
            }
        }
        report.correct = report.true_positives + report.true_negatives;
        if report.total > 0 {
            report.accuracy = report.correct as f64 / report.total as f64;
        }
        Ok(report)
    }

    /// Write the fitted ensemble as JSON via a temporary sibling file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let ensemble = self
            .ensemble
            .as_ref()
            .ok_or_else(|| Error::model("Cannot save an untrained detector"))?;

        let bundle = ModelBundle {
            format_version: MODEL_FORMAT_VERSION,
            is_trained: true,
            normalizer: self.config.normalizer.clone(),
            ensemble: ensemble.clone(),
        };
        let bytes = serde_json::to_vec(&bundle)?;

        let file_name = path
            .file_name()
            .ok_or_else(|| Error::config(format!("Model path {} has no file name", path.display())))?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);
        std::fs::write(&tmp_path, bytes)?;
        std::fs::rename(&tmp_path, path)?;

        info!("Saved model to {:?}", path);
        Ok(())
    }

    /// Replace the fitted ensemble with a saved bundle; on any error the
    /// detector is left unchanged
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bundle = ModelBundle::read(path)?;
        let normalizer = TextNormalizer::new(bundle.normalizer.clone())?;

        self.normalizer = normalizer;
        self.config.normalizer = bundle.normalizer;
        self.config.weights = bundle.ensemble.weights;
        self.ensemble = Some(bundle.ensemble);

        info!("Loaded model from {:?}", path);
        Ok(())
    }

    pub fn model_info(&self) -> ModelInfo {
        match &self.ensemble {
            Some(ensemble) => ModelInfo {
                is_trained: true,
                models: ensemble.members().iter().map(|m| m.name().to_string()).collect(),
                weights: ensemble.weights,
                vocabulary_size: Some(ensemble.vectorizer.vocabulary_size()),
                training: Some(ensemble.training.clone()),
            },
            None => ModelInfo {
                is_trained: false,
                models: vec![
                    "naive_bayes".to_string(),
                    "random_forest".to_string(),
                    "gradient_boosting".to_string(),
                ],
                weights: self.config.weights,
                vocabulary_size: None,
                training: None,
            },
        }
    }
}
