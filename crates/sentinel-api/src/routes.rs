//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use sentinel_classifiers::ModelInfo;
use sentinel_core::{DetectionResult, ScamCategory};
use sentinel_telemetry::{metrics, StatsSnapshot};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::time::Instant;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{CorsConfig, InputLimits};
use crate::error::ApiError;
use crate::state::AppState;

/// Upper bound on request bodies; a full batch of maximum-length messages fits
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

const SERVICE_NAME: &str = "Sentinel Scam Message Detector API";
const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health_check))
        .route("/detect", post(detect))
        .route("/detect-batch", post(detect_batch))
        .route("/analytics", get(analytics))
        .route("/statistics", get(statistics))
        .route("/info", get(api_info))
        .route("/docs", get(api_docs))
        .layer(cors_layer(&state.config.cors));

    Router::new()
        .route("/", get(index))
        .route("/metrics", get(prometheus_metrics))
        .nest("/api", api)
        .fallback(fallback)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if config.allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn index() -> Json<Value> {
    Json(json!({
        "message": SERVICE_NAME,
        "version": VERSION,
        "docs": "/api/docs",
        "health": "/api/health",
    }))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    metrics::record_request("health");
    let model_loaded = state
        .detector()
        .map(|detector| detector.is_trained())
        .unwrap_or(false);

    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "version": VERSION,
        "model_loaded": model_loaded,
    }))
}

async fn prometheus_metrics(State(state): State<AppState>) -> String {
    state
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

async fn fallback() -> ApiError {
    ApiError::NotFound
}

/// Single detection response: the result plus request bookkeeping
#[derive(Debug, Serialize)]
struct DetectResponse {
    #[serde(flatten)]
    result: DetectionResult,
    request_id: String,
    timestamp: DateTime<Utc>,
}

async fn detect(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DetectResponse>, ApiError> {
    metrics::record_request("detect");
    let Json(body) = payload.map_err(json_rejection)?;

    let message = body
        .get("message")
        .map(|value| match value {
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other.clone(),
        });
    let message = validate_message(message.as_ref(), &state.config.limits)?.to_string();

    let detector = state.detector().ok_or(ApiError::NotInitialized)?;

    let started = Instant::now();
    let result = detector.detect(&message);
    let latency_us = started.elapsed().as_micros() as u64;

    state.stats.record(&result);
    metrics::record_detection(&result, latency_us);
    debug!(
        "Detection took {}us: is_scam={} confidence={:.4}",
        latency_us, result.is_scam, result.confidence
    );

    Ok(Json(DetectResponse {
        result,
        request_id: Uuid::new_v4().to_string(),
        timestamp: Utc::now(),
    }))
}

#[derive(Debug, Serialize)]
struct BatchSummary {
    total: usize,
    scams_detected: usize,
    legitimate_detected: usize,
    average_confidence: f64,
    scam_rate: f64,
    skipped: usize,
}

impl BatchSummary {
    fn from_results(results: &[DetectionResult], skipped: usize) -> Self {
        let total = results.len();
        let scams_detected = results.iter().filter(|r| r.is_scam).count();
        let (average_confidence, scam_rate) = if total == 0 {
            (0.0, 0.0)
        } else {
            let confidence_sum: f64 = results.iter().map(|r| r.confidence).sum();
            (
                round4(confidence_sum / total as f64),
                round4(scams_detected as f64 / total as f64),
            )
        };

        Self {
            total,
            scams_detected,
            legitimate_detected: total - scams_detected,
            average_confidence,
            scam_rate,
            skipped,
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchResponse {
    results: Vec<DetectionResult>,
    summary: BatchSummary,
}

async fn detect_batch(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BatchResponse>, ApiError> {
    metrics::record_request("detect_batch");
    let Json(body) = payload.map_err(json_rejection)?;
    let limits = &state.config.limits;

    let messages = match body.get("messages") {
        None => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(_) => return Err(ApiError::invalid("messages must be a list")),
    };
    if messages.is_empty() {
        return Err(ApiError::invalid("messages list cannot be empty"));
    }
    if messages.len() > limits.max_batch_size {
        return Err(ApiError::invalid(format!(
            "Batch size exceeds maximum of {}",
            limits.max_batch_size
        )));
    }

    let valid: Vec<String> = messages
        .iter()
        .filter_map(|value| validate_message(Some(value), limits).ok())
        .map(str::to_string)
        .collect();
    let skipped = messages.len() - valid.len();
    if valid.is_empty() {
        return Err(ApiError::invalid("No valid messages in batch"));
    }
    if skipped > 0 {
        debug!("Skipping {} invalid messages in batch", skipped);
    }

    let detector = state.detector().ok_or(ApiError::NotInitialized)?;

    let started = Instant::now();
    let results = tokio::task::spawn_blocking(move || detector.detect_batch(&valid)).await?;
    let per_message_us = started.elapsed().as_micros() as u64 / results.len().max(1) as u64;

    for result in &results {
        state.stats.record(result);
        metrics::record_detection(result, per_message_us);
    }

    let summary = BatchSummary::from_results(&results, skipped);
    info!(
        "Batch of {} messages: {} scams, {} skipped",
        summary.total, summary.scams_detected, summary.skipped
    );
    Ok(Json(BatchResponse { results, summary }))
}

#[derive(Debug, Serialize)]
struct AnalyticsResponse {
    model_info: Option<ModelInfo>,
    scam_categories: Map<String, Value>,
    service: ServiceInfo,
}

#[derive(Debug, Serialize)]
struct ServiceInfo {
    name: &'static str,
    version: &'static str,
    started_at: DateTime<Utc>,
}

async fn analytics(State(state): State<AppState>) -> Json<AnalyticsResponse> {
    metrics::record_request("analytics");
    let scam_categories = ScamCategory::ALL
        .iter()
        .filter(|category| **category != ScamCategory::Unknown)
        .map(|category| {
            (
                category.label().to_string(),
                Value::String(category.description().to_string()),
            )
        })
        .collect();

    Json(AnalyticsResponse {
        model_info: state.detector().map(|detector| detector.model_info()),
        scam_categories,
        service: ServiceInfo {
            name: SERVICE_NAME,
            version: VERSION,
            started_at: state.started_at,
        },
    })
}

#[derive(Debug, Serialize)]
struct StatisticsResponse {
    #[serde(flatten)]
    snapshot: StatsSnapshot,
    scam_rate: f64,
    since: DateTime<Utc>,
}

async fn statistics(State(state): State<AppState>) -> Json<StatisticsResponse> {
    metrics::record_request("statistics");
    let snapshot = state.stats.snapshot();
    Json(StatisticsResponse {
        scam_rate: round4(snapshot.scam_rate()),
        snapshot,
        since: state.started_at,
    })
}

async fn api_info() -> Json<Value> {
    Json(json!({
        "api_name": SERVICE_NAME,
        "version": VERSION,
        "description": "Ensemble classifier for detecting and categorizing scam messages",
        "endpoints": {
            "POST /api/detect": "Detect if a single message is a scam",
            "POST /api/detect-batch": "Detect scams in multiple messages",
            "GET /api/health": "Health check",
            "GET /api/analytics": "Get model analytics",
            "GET /api/statistics": "Get detection statistics since start",
            "GET /api/info": "Get API information",
            "GET /api/docs": "Get request and response schemas",
            "GET /metrics": "Prometheus metrics",
        },
        "docs": "/api/docs",
        "status": "operational",
    }))
}

async fn api_docs(State(state): State<AppState>) -> Json<Value> {
    let limits = &state.config.limits;
    Json(json!({
        "title": format!("{} Documentation", SERVICE_NAME),
        "version": VERSION,
        "endpoints": [
            {
                "path": "/api/detect",
                "method": "POST",
                "description": "Analyze a single message for scam indicators",
                "request": {
                    "content_type": "application/json",
                    "schema": {
                        "message": format!(
                            "string (required, {}-{} characters)",
                            limits.min_message_chars, limits.max_message_chars
                        ),
                    },
                },
                "response": {
                    "is_scam": "boolean",
                    "confidence": "float (0-1)",
                    "scam_type": "string",
                    "risk_level": "string (unknown/low/medium/high/critical)",
                    "features": "object",
                    "confidence_breakdown": "object",
                    "explanation": "string",
                    "request_id": "string (uuid)",
                    "timestamp": "string (RFC 3339)",
                },
            },
            {
                "path": "/api/detect-batch",
                "method": "POST",
                "description": "Analyze multiple messages at once; invalid messages are skipped",
                "request": {
                    "content_type": "application/json",
                    "schema": {
                        "messages": format!("array of strings (at most {})", limits.max_batch_size),
                    },
                },
                "response": {
                    "results": "array of detection results",
                    "summary": "total, scams_detected, legitimate_detected, average_confidence, scam_rate, skipped",
                },
            },
        ],
    }))
}

/// Check a message value against the input limits
///
/// Length is measured in characters; the minimum applies to the trimmed text.
fn validate_message<'a>(value: Option<&'a Value>, limits: &InputLimits) -> Result<&'a str, ApiError> {
    let message = match value {
        None | Some(Value::Null) => return Err(ApiError::invalid("Message cannot be empty")),
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(ApiError::invalid("Message must be a string")),
    };
    if message.is_empty() {
        return Err(ApiError::invalid("Message cannot be empty"));
    }
    if message.chars().count() > limits.max_message_chars {
        return Err(ApiError::invalid(format!(
            "Message exceeds maximum length of {} characters",
            limits.max_message_chars
        )));
    }
    if message.trim().chars().count() < limits.min_message_chars {
        return Err(ApiError::invalid(format!(
            "Message must be at least {} characters",
            limits.min_message_chars
        )));
    }
    Ok(message)
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::invalid("Content-Type must be application/json")
        }
        other => ApiError::invalid(format!("Invalid JSON body: {}", other.body_text())),
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> InputLimits {
        InputLimits::default()
    }

    fn message_error(value: Value) -> String {
        validate_message(Some(&value), &limits())
            .unwrap_err()
            .to_string()
    }

    #[test]
    fn test_validate_message_errors() {
        assert_eq!(
            validate_message(None, &limits()).unwrap_err().to_string(),
            "Message cannot be empty"
        );
        assert_eq!(message_error(json!("")), "Message cannot be empty");
        assert_eq!(message_error(json!(42)), "Message must be a string");
        assert_eq!(
            message_error(json!("  a  ")),
            "Message must be at least 3 characters"
        );
        assert_eq!(
            message_error(json!("x".repeat(5001))),
            "Message exceeds maximum length of 5000 characters"
        );
    }

    #[test]
    fn test_validate_message_counts_characters() {
        let value = json!("é".repeat(5000));
        assert!(validate_message(Some(&value), &limits()).is_ok());
    }

    #[test]
    fn test_batch_summary_rounding() {
        let mut scam = DetectionResult::untrained();
        scam.is_scam = true;
        scam.confidence = 0.9;
        let mut legit = DetectionResult::untrained();
        legit.confidence = 0.1;
        let mut other = DetectionResult::untrained();
        other.confidence = 0.2;

        let summary = BatchSummary::from_results(&[scam, legit, other], 2);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.scams_detected, 1);
        assert_eq!(summary.legitimate_detected, 2);
        assert_eq!(summary.average_confidence, 0.4);
        assert_eq!(summary.scam_rate, 0.3333);
        assert_eq!(summary.skipped, 2);
    }
}
