use super::*;

#[test]
fn every_task_type_has_a_distinct_prompt_ending_in_the_capabilities_block() {
    for task_type in TaskType::FALLBACK_ORDER {
        let prompt = system_prompt(task_type);
        assert!(prompt.ends_with(CAPABILITIES_BLOCK));
        assert!(prompt.len() > CAPABILITIES_BLOCK.len());
    }
}

#[test]
fn project_prompt_mentions_registered_commands() {
    let prompt = system_prompt(TaskType::Project);
    assert!(prompt.contains("registered"));
}
