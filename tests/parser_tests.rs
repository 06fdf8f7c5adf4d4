use chrono::{TimeZone, Utc};

use pulsecheck::api::types::AnswerRequest;
use pulsecheck::api::{DailyQuestionPayload, ParseError, StatusPayload};
use pulsecheck::model::{AssessmentStatus, QuestionKind};

#[test]
fn active_question_payload_normalizes() {
    let payload: StatusPayload = serde_json::from_str(
        r#"{
            "state": "ACTIVE_QUESTION",
            "assessmentId": "a-1",
            "entryId": "e-7",
            "question": { "order": 2, "type": "BARRIER", "text": "Anything blocking you?" },
            "expiresAt": "2025-06-02T09:00:30Z",
            "nextQuestionOrder": 3
        }"#,
    )
    .unwrap();

    let status = payload.normalize().unwrap();
    let AssessmentStatus::ActiveQuestion {
        entry_id,
        question,
        expires_at,
        next_question_order,
        ..
    } = status
    else {
        panic!("expected active question");
    };
    assert_eq!(entry_id, "e-7");
    assert_eq!(question.order, 2);
    assert_eq!(question.kind, QuestionKind::Barrier);
    assert_eq!(
        expires_at,
        Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 30).unwrap()
    );
    assert_eq!(next_question_order, Some(3));
}

#[test]
fn locked_payload_normalizes() {
    let payload: StatusPayload = serde_json::from_str(
        r#"{ "state": "LOCKED", "assessmentId": "a-1", "unlockTime": "2025-06-02T09:05:00Z" }"#,
    )
    .unwrap();
    assert!(matches!(
        payload.normalize().unwrap(),
        AssessmentStatus::Locked { .. }
    ));
}

#[test]
fn missing_state_is_idle() {
    let payload: StatusPayload = serde_json::from_str("{}").unwrap();
    assert_eq!(payload.normalize().unwrap(), AssessmentStatus::Idle);
}

#[test]
fn unknown_state_tag_is_a_parse_error() {
    let payload: StatusPayload =
        serde_json::from_str(r#"{ "state": "PAUSED" }"#).unwrap();
    assert!(matches!(
        payload.normalize(),
        Err(ParseError::UnknownState(tag)) if tag == "PAUSED"
    ));
}

#[test]
fn active_without_question_is_a_parse_error() {
    let payload: StatusPayload = serde_json::from_str(
        r#"{ "state": "ACTIVE_QUESTION", "entryId": "e-1", "expiresAt": "2025-06-02T09:00:30Z" }"#,
    )
    .unwrap();
    assert!(matches!(
        payload.normalize(),
        Err(ParseError::MissingField { field: "question", .. })
    ));
}

#[test]
fn locked_without_unlock_time_is_a_parse_error() {
    let payload: StatusPayload = serde_json::from_str(r#"{ "state": "LOCKED" }"#).unwrap();
    assert!(matches!(
        payload.normalize(),
        Err(ParseError::MissingField { field: "unlockTime", .. })
    ));
}

#[test]
fn unknown_question_type_is_a_parse_error() {
    let payload: StatusPayload = serde_json::from_str(
        r#"{
            "state": "ACTIVE_QUESTION",
            "entryId": "e-1",
            "expiresAt": "2025-06-02T09:00:30Z",
            "question": { "order": 1, "type": "RIDDLE", "text": "?" }
        }"#,
    )
    .unwrap();
    assert!(matches!(
        payload.normalize(),
        Err(ParseError::UnknownKind(tag)) if tag == "RIDDLE"
    ));
}

#[test]
fn unexpected_fields_are_ignored() {
    let payload: StatusPayload = serde_json::from_str(
        r#"{ "state": "IDLE", "debug": true, "serverVersion": "2.4.1" }"#,
    )
    .unwrap();
    assert_eq!(payload.normalize().unwrap(), AssessmentStatus::Idle);
}

#[test]
fn daily_question_payload_normalizes() {
    let payload: DailyQuestionPayload = serde_json::from_str(
        r#"{ "id": "d-1", "question": "Sleep well?", "type": "FACT", "answeredAt": "2025-06-01T20:00:00Z" }"#,
    )
    .unwrap();
    let question = payload.normalize().unwrap();
    assert_eq!(question.id, "d-1");
    assert_eq!(question.kind, QuestionKind::Fact);
    assert!(question.answered_at.is_some());
}

#[test]
fn daily_question_without_id_is_a_parse_error() {
    let payload: DailyQuestionPayload =
        serde_json::from_str(r#"{ "question": "Sleep well?", "type": "FACT" }"#).unwrap();
    assert!(matches!(
        payload.normalize(),
        Err(ParseError::MissingField { field: "id", .. })
    ));
}

#[test]
fn answer_request_serializes_camel_case() {
    let request = AnswerRequest {
        answer_text: Some("fine".to_string()),
        answer_value: None,
        time_to_answer: 12,
    };
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["answerText"], "fine");
    assert_eq!(json["timeToAnswer"], 12);
    assert!(json["answerValue"].is_null());
}
