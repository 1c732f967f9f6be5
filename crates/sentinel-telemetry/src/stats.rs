//! Running detection statistics

use sentinel_core::{DetectionResult, ScamCategory};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Confidence is accumulated in millionths to stay in an integer atomic
const CONFIDENCE_SCALE: f64 = 1_000_000.0;

/// Counters of every detection served since start
#[derive(Clone)]
pub struct DetectionStats {
    inner: Arc<StatsInner>,
}

struct StatsInner {
    messages_analyzed: AtomicU64,
    scams_detected: AtomicU64,
    confidence_micros: AtomicU64,
    categories: [AtomicU64; ScamCategory::ALL.len()],
}

impl DetectionStats {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StatsInner {
                messages_analyzed: AtomicU64::new(0),
                scams_detected: AtomicU64::new(0),
                confidence_micros: AtomicU64::new(0),
                categories: std::array::from_fn(|_| AtomicU64::new(0)),
            }),
        }
    }

    /// Count one detection; the category is counted for scams only
    pub fn record(&self, result: &DetectionResult) {
        self.inner.messages_analyzed.fetch_add(1, Ordering::Relaxed);
        self.inner.confidence_micros.fetch_add(
            (result.confidence.clamp(0.0, 1.0) * CONFIDENCE_SCALE).round() as u64,
            Ordering::Relaxed,
        );
        if result.is_scam {
            self.inner.scams_detected.fetch_add(1, Ordering::Relaxed);
            self.inner.categories[result.scam_type.index()].fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let messages_analyzed = self.inner.messages_analyzed.load(Ordering::Relaxed);
        let scams_detected = self.inner.scams_detected.load(Ordering::Relaxed);
        let confidence_sum =
            self.inner.confidence_micros.load(Ordering::Relaxed) as f64 / CONFIDENCE_SCALE;

        let mut scam_types: Vec<CategoryCount> = ScamCategory::ALL
            .iter()
            .map(|category| CategoryCount {
                category: *category,
                count: self.inner.categories[category.index()].load(Ordering::Relaxed),
            })
            .filter(|c| c.count > 0)
            .collect();
        scam_types.sort_by(|a, b| b.count.cmp(&a.count).then(a.category.cmp(&b.category)));

        StatsSnapshot {
            messages_analyzed,
            scams_detected,
            legitimate_detected: messages_analyzed - scams_detected,
            average_confidence: if messages_analyzed == 0 {
                0.0
            } else {
                confidence_sum / messages_analyzed as f64
            },
            scam_types,
        }
    }
}

impl Default for DetectionStats {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: ScamCategory,
    pub count: u64,
}

/// Point-in-time view of [`DetectionStats`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub messages_analyzed: u64,
    pub scams_detected: u64,
    pub legitimate_detected: u64,
    pub average_confidence: f64,
    /// Scam categories, most frequent first
    pub scam_types: Vec<CategoryCount>,
}

impl StatsSnapshot {
    pub fn scam_rate(&self) -> f64 {
        if self.messages_analyzed == 0 {
            0.0
        } else {
            self.scams_detected as f64 / self.messages_analyzed as f64
        }
    }
}
