use super::*;

#[test]
fn new_task_starts_pending() {
    let task = Task::new("u1", "build me a dashboard", 1_000);
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(task.completed_at_ms.is_none());
}

#[test]
fn status_advances_monotonically() {
    let mut task = Task::new("u1", "hi", 0);
    task.set_status(TaskStatus::Running);
    task.set_status(TaskStatus::Done);
    assert_eq!(task.status, TaskStatus::Done);
    assert!(task.status.is_terminal());
}

#[test]
#[should_panic(expected = "advance monotonically")]
fn status_cannot_go_backward() {
    let mut task = Task::new("u1", "hi", 0);
    task.set_status(TaskStatus::Done);
    task.set_status(TaskStatus::Running);
}

#[test]
fn token_usage_accumulates() {
    let mut usage = TokenUsage::default();
    usage.add(TokenUsage { input: 10, output: 5, thinking: 2 });
    usage.add(TokenUsage { input: 1, output: 1, thinking: 0 });
    assert_eq!(usage, TokenUsage { input: 11, output: 6, thinking: 2 });
}

#[test]
fn task_type_round_trips_through_json() {
    for ty in TaskType::FALLBACK_ORDER {
        let json = serde_json::to_string(&ty).unwrap();
        let back: TaskType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ty);
    }
}
