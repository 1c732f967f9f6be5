//! HTTP route tests driven through the router with `oneshot`

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use sentinel_api::{create_router, AppState, ServiceConfig};
use sentinel_classifiers::{DetectorConfig, ScamDetector, TrainingSet};
use serde_json::{json, Value};
use std::sync::OnceLock;
use tower::ServiceExt;

fn trained_detector() -> ScamDetector {
    static BUNDLE: OnceLock<tempfile::TempDir> = OnceLock::new();
    let dir = BUNDLE.get_or_init(|| {
        let mut config = DetectorConfig::default();
        config.random_forest.n_trees = 20;
        config.gradient_boosting.n_rounds = 20;

        let corpus = TrainingSet::canonical();
        let mut detector = ScamDetector::new(config).unwrap();
        detector.train(&corpus.messages, &corpus.labels).unwrap();

        let dir = tempfile::tempdir().unwrap();
        detector.save(dir.path().join("bundle.json")).unwrap();
        dir
    });
    ScamDetector::from_file(DetectorConfig::default(), dir.path().join("bundle.json")).unwrap()
}

fn trained_app() -> Router {
    create_router(AppState::with_detector(
        ServiceConfig::default(),
        trained_detector(),
        None,
    ))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_index_banner() {
    let (status, body) = send(trained_app(), Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["docs"], "/api/docs");
    assert_eq!(body["health"], "/api/health");
}

#[tokio::test]
async fn test_health_reports_model_loaded() {
    let (status, body) = send(trained_app(), Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);
    assert!(body["timestamp"].is_string());

    let empty = create_router(AppState::new(ServiceConfig::default(), None));
    let (status, body) = send(empty, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn test_detect_scam_message() {
    let (status, body) = send(
        trained_app(),
        Method::POST,
        "/api/detect",
        Some(json!({
            "message": "Congratulations! You've won $1,000,000! Click here to claim your prize"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_scam"], true);
    let confidence = body["confidence"].as_f64().unwrap();
    assert!(confidence > 0.5 && confidence <= 1.0);
    assert!(body["scam_type"].is_string());
    assert!(body["risk_level"].is_string());
    assert!(body["features"]["message_length"].is_u64());
    assert!(body["confidence_breakdown"]["naive_bayes"].is_f64());
    assert!(body["explanation"].is_string());
    assert_eq!(body["request_id"].as_str().unwrap().len(), 36);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_detect_validation_errors() {
    let cases = [
        (json!({ "message": "" }), "Message cannot be empty"),
        (json!({ "message": "   " }), "Message cannot be empty"),
        (json!({}), "Message cannot be empty"),
        (json!({ "message": 12 }), "Message must be a string"),
        (json!({ "message": "hi" }), "Message must be at least 3 characters"),
        (
            json!({ "message": "a".repeat(5001) }),
            "Message exceeds maximum length of 5000 characters",
        ),
    ];

    for (payload, expected) in cases {
        let (status, body) = send(trained_app(), Method::POST, "/api/detect", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], expected);
    }
}

#[tokio::test]
async fn test_detect_rejects_malformed_json() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/detect")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = trained_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_detect_requires_json_content_type() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/detect")
        .body(Body::from(r#"{"message":"hello there"}"#))
        .unwrap();

    let response = trained_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Content-Type must be application/json");
}

#[tokio::test]
async fn test_detect_without_detector_is_unavailable() {
    let app = create_router(AppState::new(ServiceConfig::default(), None));
    let (status, body) = send(
        app,
        Method::POST,
        "/api/detect",
        Some(json!({ "message": "Verify your account now" })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Detector not initialized");
}

#[tokio::test]
async fn test_untrained_detector_returns_fallback() {
    let detector = ScamDetector::new(DetectorConfig::default()).unwrap();
    let app = create_router(AppState::with_detector(
        ServiceConfig::default(),
        detector,
        None,
    ));

    let (status, body) = send(
        app,
        Method::POST,
        "/api/detect",
        Some(json!({ "message": "Verify your account now" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_scam"], false);
    assert_eq!(body["confidence"], 0.0);
    assert_eq!(body["scam_type"], "unknown");
    assert_eq!(body["risk_level"], "unknown");
    assert_eq!(body["features"], json!({}));
    assert_eq!(body["confidence_breakdown"], json!({}));
    assert_eq!(body["explanation"], "model not trained");
}

#[tokio::test]
async fn test_batch_detection_skips_invalid_messages() {
    let (status, body) = send(
        trained_app(),
        Method::POST,
        "/api/detect-batch",
        Some(json!({
            "messages": [
                "Hi, let's meet for coffee tomorrow at 3pm",
                "URGENT: Verify your bank account now or it will be suspended",
                "",
                42,
                "ok"
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);

    let summary = &body["summary"];
    assert_eq!(summary["total"], 2);
    assert_eq!(summary["skipped"], 3);
    let scams = summary["scams_detected"].as_u64().unwrap();
    let legitimate = summary["legitimate_detected"].as_u64().unwrap();
    assert_eq!(scams + legitimate, 2);
    let rate = summary["scam_rate"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&rate));
}

#[tokio::test]
async fn test_batch_validation_errors() {
    let too_many: Vec<String> = (0..1001).map(|i| format!("message {}", i)).collect();
    let cases = [
        (json!({ "messages": "not a list" }), "messages must be a list"),
        (json!({ "messages": [] }), "messages list cannot be empty"),
        (json!({}), "messages list cannot be empty"),
        (json!({ "messages": too_many }), "Batch size exceeds maximum of 1000"),
        (json!({ "messages": ["", "a", 7] }), "No valid messages in batch"),
    ];

    for (payload, expected) in cases {
        let (status, body) =
            send(trained_app(), Method::POST, "/api/detect-batch", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], expected);
    }
}

#[tokio::test]
async fn test_statistics_track_detections() {
    let state = AppState::with_detector(ServiceConfig::default(), trained_detector(), None);
    let app = create_router(state.clone());

    let (status, _) = send(
        app.clone(),
        Method::POST,
        "/api/detect-batch",
        Some(json!({
            "messages": [
                "Congratulations! You've won $1,000,000! Click here to claim your prize",
                "Can you send me the report by Friday?"
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app, Method::GET, "/api/statistics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages_analyzed"], 2);
    let scams = body["scams_detected"].as_u64().unwrap();
    assert_eq!(
        body["scam_types"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["count"].as_u64().unwrap())
            .sum::<u64>(),
        scams
    );
    assert_eq!(state.stats.snapshot().messages_analyzed, 2);
}

#[tokio::test]
async fn test_analytics_describes_model_and_categories() {
    let (status, body) = send(trained_app(), Method::GET, "/api/analytics", None).await;
    assert_eq!(status, StatusCode::OK);

    let info = &body["model_info"];
    assert_eq!(info["is_trained"], true);
    assert_eq!(
        info["models"],
        json!(["naive_bayes", "random_forest", "gradient_boosting"])
    );
    assert_eq!(info["weights"]["gradient_boosting"], 0.4);
    assert!(info["vocabulary_size"].as_u64().unwrap() > 0);
    assert_eq!(info["training"]["samples"], 30);

    let categories = body["scam_categories"].as_object().unwrap();
    assert_eq!(categories.len(), 10);
    assert!(categories.contains_key("phishing"));
    assert!(!categories.contains_key("unknown"));
}

#[tokio::test]
async fn test_info_and_docs() {
    let (status, body) = send(trained_app(), Method::GET, "/api/info", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "operational");
    assert!(body["endpoints"]["POST /api/detect"].is_string());

    let (status, body) = send(trained_app(), Method::GET, "/api/docs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoints"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_metrics_without_recorder_is_empty() {
    let response = trained_app()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (status, body) = send(trained_app(), Method::GET, "/api/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found");
}

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/detect")
        .header(header::ORIGIN, "https://client.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = trained_app().oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}
