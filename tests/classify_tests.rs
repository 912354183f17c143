//! Classifier contract as seen by the application layer

use swasthya::ai::{AIError, AIErrorKind, ProviderFailure, classify_error};

fn classify(status: Option<u16>, message: &str) -> AIError {
    classify_error(&ProviderFailure {
        status,
        message: message.to_string(),
        offline: false,
    })
}

#[test]
fn quota_exceeded_with_429() {
    let err = classify(Some(429), "Quota exceeded");
    assert_eq!(err.kind, AIErrorKind::Quota);
    assert!(err.is_retryable);
}

#[test]
fn exhausted_without_status() {
    let err = classify(None, "Resource has been exhausted");
    assert_eq!(err.kind, AIErrorKind::Quota);
    assert!(err.is_retryable);
}

#[test]
fn bare_401() {
    let err = classify(Some(401), "");
    assert_eq!(err.kind, AIErrorKind::Unauthorized);
    assert!(!err.is_retryable);
}

#[test]
fn api_key_mentions_are_never_retryable() {
    for status in [None, Some(400), Some(403), Some(429), Some(500)] {
        let err = classify(status, "Missing API KEY for request");
        assert_eq!(err.kind, AIErrorKind::Unauthorized);
        assert!(!err.is_retryable);
    }
}

#[test]
fn quota_needles_regardless_of_case() {
    for message in ["QUOTA reached", "HTTP 429", "tokens EXHAUSTED", "Rate LIMIT hit"] {
        let err = classify(None, message);
        assert_eq!(err.kind, AIErrorKind::Quota, "{message}");
        assert!(err.is_retryable);
    }
}

#[test]
fn unmatched_is_unknown() {
    for (status, message) in [(None, ""), (Some(500), "boom"), (Some(503), "try later")] {
        let err = classify(status, message);
        assert_eq!(err.kind, AIErrorKind::Unknown);
        assert!(err.is_retryable);
    }
}

#[test]
fn classification_is_deterministic() {
    let failure = ProviderFailure::with_status(400, "Request contains an invalid argument.");
    let first = classify_error(&failure);
    for _ in 0..10 {
        assert_eq!(classify_error(&failure), first);
    }
}

#[test]
fn message_is_user_facing_text() {
    let err = classify(Some(429), "Quota exceeded");
    assert_eq!(err.message, AIErrorKind::Quota.user_message());
    assert_eq!(err.to_string(), err.message);
}

#[test]
fn kind_serializes_lowercase() {
    let err = classify(Some(401), "");
    let value = serde_json::to_value(&err).unwrap();
    assert_eq!(value["kind"], "unauthorized");
    assert_eq!(value["is_retryable"], false);
}
