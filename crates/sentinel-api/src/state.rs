//! Shared application state and detector initialization

use crate::config::ServiceConfig;
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::RwLock;
use sentinel_classifiers::{ScamDetector, TrainingSet};
use sentinel_telemetry::DetectionStats;
use std::sync::Arc;
use tracing::{info, warn};

/// Swappable detector slot; `None` until initialization finishes
pub type DetectorHandle = Arc<RwLock<Option<Arc<ScamDetector>>>>;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    detector: DetectorHandle,
    pub stats: DetectionStats,
    pub metrics_handle: Option<PrometheusHandle>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// State with an empty detector slot
    pub fn new(config: ServiceConfig, metrics_handle: Option<PrometheusHandle>) -> Self {
        Self {
            config: Arc::new(config),
            detector: Arc::new(RwLock::new(None)),
            stats: DetectionStats::new(),
            metrics_handle,
            started_at: Utc::now(),
        }
    }

    /// State with a ready detector
    pub fn with_detector(
        config: ServiceConfig,
        detector: ScamDetector,
        metrics_handle: Option<PrometheusHandle>,
    ) -> Self {
        let state = Self::new(config, metrics_handle);
        state.install(detector);
        state
    }

    /// Current detector, if one has been installed
    pub fn detector(&self) -> Option<Arc<ScamDetector>> {
        self.detector.read().clone()
    }

    /// Replace the detector; requests already running keep the old one
    pub fn install(&self, detector: ScamDetector) {
        *self.detector.write() = Some(Arc::new(detector));
    }
}

/// Build the detector the service starts with
///
/// A saved bundle at `model_path` is loaded. Without one, the canonical
/// corpus is trained and saved when `train_if_missing` is set; otherwise the
/// detector stays untrained and answers with fallback results.
pub fn init_detector(config: &ServiceConfig) -> anyhow::Result<ScamDetector> {
    let mut detector = ScamDetector::new(config.detector.clone())?;
    let model_path = &config.model_path;

    if model_path.exists() {
        info!("Loading model from {:?}", model_path);
        detector.load(model_path)?;
        return Ok(detector);
    }

    if config.train_if_missing {
        info!(
            "No model at {:?}; training on the canonical corpus",
            model_path
        );
        let corpus = TrainingSet::canonical();
        detector.train(&corpus.messages, &corpus.labels)?;
        detector.save(model_path)?;
    } else {
        warn!(
            "No pre-trained model found at {:?}; detections will use the untrained fallback",
            model_path
        );
    }
    Ok(detector)
}
