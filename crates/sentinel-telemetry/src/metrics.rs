//! Prometheus metrics emitted through the `metrics` facade
//!
//! Nothing is recorded unless a recorder (the Prometheus exporter in the
//! API binary) is installed.

use sentinel_core::DetectionResult;

pub const REQUESTS_TOTAL: &str = "sentinel_requests_total";
pub const DETECTIONS_TOTAL: &str = "sentinel_detections_total";
pub const DETECTION_LATENCY_US: &str = "sentinel_detection_latency_us";

/// Count one API request
pub fn record_request(endpoint: &'static str) {
    metrics::counter!(REQUESTS_TOTAL, "endpoint" => endpoint).increment(1);
}

/// Count one detection and record how long it took
pub fn record_detection(result: &DetectionResult, latency_us: u64) {
    let verdict = if result.is_scam { "scam" } else { "legitimate" };
    metrics::counter!(DETECTIONS_TOTAL, "verdict" => verdict).increment(1);
    metrics::histogram!(DETECTION_LATENCY_US).record(latency_us as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_request("detect");
        record_detection(&DetectionResult::untrained(), 42);
    }
}
