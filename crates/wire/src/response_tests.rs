use super::*;
use taskd_core::{TaskStatus, TaskType};

#[test]
fn ok_and_pong_have_no_payload() {
    assert_eq!(serde_json::to_string(&Response::Ok).unwrap(), r#"{"type":"Ok"}"#);
    assert_eq!(serde_json::to_string(&Response::Pong).unwrap(), r#"{"type":"Pong"}"#);
}

#[test]
fn task_submitted_round_trips() {
    let response = Response::TaskSubmitted {
        task: TaskSummary {
            id: taskd_core::TaskId::new(),
            status: TaskStatus::Pending,
            task_type: Some(TaskType::Code),
            stage: None,
            live_tail: Vec::new(),
            created_at_ms: 10,
            message_preview: "hi".to_string(),
        },
    };
    let json = serde_json::to_string(&response).expect("serialize");
    let back: Response = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(response, back);
}

#[test]
fn error_carries_message() {
    let response = Response::Error { message: "budget exceeded".to_string() };
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["message"], "budget exceeded");
}
