// Tests for event/result payload serialization
//
// Subscribers commonly forward recognizer events over IPC or log sinks as
// JSON, so the payload types must round-trip through serde_json.

use speech_coordinator::{RecognitionResult, RecognizerEvent};

#[test]
fn test_result_serialization() {
    let result = RecognitionResult {
        result_id: "r-1".to_string(),
        text: "turn on the lights".to_string(),
        confidence: Some(0.87),
        partial: false,
    };

    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"result_id\":\"r-1\""));
    assert!(json.contains("turn on the lights"));
    assert!(json.contains("\"partial\":false"));

    let deserialized: RecognitionResult = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized.result_id, "r-1");
    assert_eq!(deserialized.text, "turn on the lights");
    assert_eq!(deserialized.confidence, Some(0.87));
    assert!(!deserialized.partial);
}

#[test]
fn test_partial_result_has_fresh_id_and_no_confidence() {
    let result = RecognitionResult::partial_text("turn on");

    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"partial\":true"));
    assert!(json.contains("\"confidence\":null"));

    let deserialized: RecognitionResult = serde_json::from_str(&json).unwrap();
    assert!(deserialized.partial);
    assert!(!deserialized.result_id.is_empty());
}

#[test]
fn test_lifecycle_event_round_trip() {
    let event = RecognizerEvent::SessionStarted {
        session_id: "s-1".to_string(),
    };

    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("SessionStarted"));
    assert!(json.contains("\"session_id\":\"s-1\""));

    let deserialized: RecognizerEvent = serde_json::from_str(&json).unwrap();
    assert!(matches!(
        deserialized,
        RecognizerEvent::SessionStarted { .. }
    ));
    assert_eq!(deserialized.session_id(), "s-1");
}

#[test]
fn test_result_event_round_trip() {
    let event = RecognizerEvent::Result {
        session_id: "s-2".to_string(),
        result: RecognitionResult::final_text("hello world", Some(0.95)),
    };

    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("Result"));
    assert!(json.contains("hello world"));

    let deserialized: RecognizerEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized.session_id(), "s-2");
    match deserialized {
        RecognizerEvent::Result { result, .. } => {
            assert_eq!(result.text, "hello world");
            assert_eq!(result.confidence, Some(0.95));
            assert!(!result.partial);
        }
        other => panic!("unexpected event: {:?}", other),
    }
}
