//! Sentinel Telemetry
//!
//! Detection statistics and metrics for Sentinel.
//!
//! Provides:
//! - Lock-free counters of detections since start, with a serializable snapshot
//! - Prometheus metric names and recording helpers

pub mod metrics;
pub mod stats;

pub use stats::{CategoryCount, DetectionStats, StatsSnapshot};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::metrics::{record_detection, record_request};
    pub use crate::stats::{DetectionStats, StatsSnapshot};
}
