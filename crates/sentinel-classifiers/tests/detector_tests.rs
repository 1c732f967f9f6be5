//! End-to-end detector tests on the canonical corpus

use sentinel_classifiers::{DetectorConfig, ScamDetector, TrainingSet};
use sentinel_core::{DetectionResult, Error, RiskLevel, ScamCategory};

const LOTTERY_MESSAGE: &str = "Congratulations! You've won $1,000,000! Click here to claim";
const MEETING_MESSAGE: &str = "Hi, can we schedule a meeting tomorrow at 2 PM?";

fn trained_detector() -> ScamDetector {
    let corpus = TrainingSet::canonical();
    let mut detector = ScamDetector::new(DetectorConfig::default()).unwrap();
    detector.train(&corpus.messages, &corpus.labels).unwrap();
    detector
}

#[test]
fn test_lottery_message_is_scam() {
    let detector = trained_detector();
    let result = detector.detect(LOTTERY_MESSAGE);

    assert!(result.is_scam, "confidence was {}", result.confidence);
    assert!(result.confidence > 0.5);
    assert!(matches!(
        result.scam_type,
        ScamCategory::LotteryPrize | ScamCategory::FinancialFraud
    ));
    assert!(result.explanation.starts_with("Detected as "));
}

#[test]
fn test_meeting_message_is_legitimate() {
    let detector = trained_detector();
    let result = detector.detect(MEETING_MESSAGE);

    assert!(!result.is_scam, "confidence was {}", result.confidence);
    assert!(result.confidence < 0.5);
    assert!(result
        .explanation
        .starts_with("This message appears to be legitimate"));
}

#[test]
fn test_training_accuracy_sanity_check() {
    let corpus = TrainingSet::canonical();
    let detector = trained_detector();
    let report = detector.evaluate(&corpus.messages, &corpus.labels).unwrap();

    assert_eq!(report.total, 30);
    assert!(report.accuracy >= 0.9, "accuracy was {}", report.accuracy);
}

#[test]
fn test_result_invariants() {
    let detector = trained_detector();
    let messages = [
        LOTTERY_MESSAGE,
        MEETING_MESSAGE,
        "",
        "!!!",
        "Verify your bank password now",
        "Привет, как дела?",
    ];

    for message in messages {
        let result = detector.detect(message);
        assert!((0.0..=1.0).contains(&result.confidence));
        assert_eq!(result.is_scam, result.confidence > 0.5);
        assert_eq!(result.risk_level, RiskLevel::from_confidence(result.confidence));

        let scores = result.confidence_breakdown.unwrap();
        for p in [scores.naive_bayes, scores.random_forest, scores.gradient_boosting] {
            assert!((0.0..=1.0).contains(&p));
        }
    }
}

#[test]
fn test_detection_is_deterministic() {
    let detector = trained_detector();
    assert_eq!(detector.detect(LOTTERY_MESSAGE), detector.detect(LOTTERY_MESSAGE));

    // Same seed, same corpus: an independently trained detector agrees
    let other = trained_detector();
    assert_eq!(detector.detect(MEETING_MESSAGE), other.detect(MEETING_MESSAGE));
}

#[test]
fn test_batch_matches_single_detection() {
    let detector = trained_detector();
    let messages = vec![LOTTERY_MESSAGE, MEETING_MESSAGE, "Your package is delayed"];

    let batch = detector.detect_batch(&messages);
    assert_eq!(batch.len(), messages.len());
    for (message, result) in messages.iter().zip(&batch) {
        assert_eq!(&detector.detect(message), result);
    }

    assert!(detector.detect_batch::<&str>(&[]).is_empty());
}

#[test]
fn test_phishing_takes_precedence_over_financial() {
    let detector = trained_detector();
    let result = detector.detect("Please verify the bank transfer");
    assert_eq!(result.scam_type, ScamCategory::Phishing);
}

#[test]
fn test_empty_message_features_are_zero() {
    let detector = trained_detector();
    let features = detector.detect("").features.unwrap();

    assert_eq!(features.message_length, 0);
    assert_eq!(features.word_count, 0);
    assert_eq!(features.uppercase_ratio, 0.0);
}

#[test]
fn test_untrained_detector_fallback() {
    let detector = ScamDetector::new(DetectorConfig::default()).unwrap();
    let result = detector.detect(LOTTERY_MESSAGE);

    assert_eq!(result, DetectionResult::untrained());
    assert_eq!(result.explanation, "model not trained");
    assert_eq!(detector.detect_batch(&[LOTTERY_MESSAGE]).len(), 1);
}

#[test]
fn test_mismatched_training_input_rejected() {
    let mut detector = ScamDetector::new(DetectorConfig::default()).unwrap();
    let err = detector.train(&["a", "b"], &[true]).unwrap_err();

    assert!(matches!(err, Error::Training(_)));
    assert!(!detector.is_trained());
}

#[test]
fn test_single_class_training_rejected() {
    let mut detector = ScamDetector::new(DetectorConfig::default()).unwrap();
    let err = detector
        .train(&["send money", "claim prize"], &[true, true])
        .unwrap_err();

    assert!(matches!(err, Error::Training(_)));
    assert!(!detector.is_trained());
}

#[test]
fn test_unusable_vocabulary_rejected() {
    let mut detector = ScamDetector::new(DetectorConfig::default()).unwrap();
    let err = detector.train(&["123", "!!!"], &[true, false]).unwrap_err();
    assert!(matches!(err, Error::Training(_)));
}

#[test]
fn test_save_then_load_reproduces_detections() {
    let detector = trained_detector();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("models").join("scam_detector.json");

    detector.save(&path).unwrap();
    assert!(path.exists());

    let loaded = ScamDetector::from_file(DetectorConfig::default(), &path).unwrap();
    assert!(loaded.is_trained());
    for message in [LOTTERY_MESSAGE, MEETING_MESSAGE, "Urgent: confirm your login"] {
        assert_eq!(detector.detect(message), loaded.detect(message));
    }
    assert_eq!(
        detector.model_info().training,
        loaded.model_info().training
    );
}

#[test]
fn test_corrupt_bundle_leaves_detector_usable() {
    let mut detector = trained_detector();
    let before = detector.detect(LOTTERY_MESSAGE);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.json");
    std::fs::write(&path, b"{ not a model").unwrap();

    let err = detector.load(&path).unwrap_err();
    assert!(matches!(err, Error::Model(_)));
    assert!(detector.is_trained());
    assert_eq!(detector.detect(LOTTERY_MESSAGE), before);
}

#[test]
fn test_wrong_format_version_rejected() {
    let detector = trained_detector();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    detector.save(&path).unwrap();

    let mut bundle: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    bundle["format_version"] = serde_json::json!(99);
    std::fs::write(&path, serde_json::to_vec(&bundle).unwrap()).unwrap();

    let mut fresh = ScamDetector::new(DetectorConfig::default()).unwrap();
    assert!(matches!(fresh.load(&path), Err(Error::Model(_))));
    assert!(!fresh.is_trained());
}

#[test]
fn test_missing_bundle_is_io_error() {
    let mut detector = ScamDetector::new(DetectorConfig::default()).unwrap();
    let err = detector.load("/nonexistent/sentinel/model.json").unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_retraining_replaces_ensemble() {
    let mut detector = trained_detector();
    let summary = detector
        .train(
            &["lunch at noon", "wire the money now", "lunch soon", "wire cash prize"],
            &[false, true, false, true],
        )
        .unwrap();

    assert_eq!(summary.samples, 4);
    assert_eq!(detector.model_info().training.unwrap().samples, 4);
}
