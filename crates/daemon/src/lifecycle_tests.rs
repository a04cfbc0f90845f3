use super::*;

fn config_in(dir: &std::path::Path) -> Config {
    let mut config = Config::from_env().expect("config from env");
    config.state_dir = dir.to_path_buf();
    config
}

#[test]
fn prepare_directories_creates_the_full_layout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());

    prepare_directories(&config).expect("prepare directories");

    assert!(config.log_dir().is_dir());
    assert!(config.uploads_dir().is_dir());
    assert!(config.outputs_dir().is_dir());
    assert!(config.state_dir.join("tasks").is_dir());
}

#[test]
fn acquire_lock_refuses_a_second_holder() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());
    prepare_directories(&config).expect("prepare directories");

    let _first = acquire_lock(&config).expect("first lock succeeds");
    let second = acquire_lock(&config);

    assert!(matches!(second, Err(LifecycleError::AlreadyRunning(_))));
}

#[test]
fn recover_rewrites_pending_and_running_tasks_to_crashed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());
    prepare_directories(&config).expect("prepare directories");

    {
        let (mut checkpointer, mut state) =
            Checkpointer::open(config.wal_path(), config.snapshot_path()).expect("open checkpointer");
        let mut running = Task::new("u1", "do a thing", 1_000);
        running.set_status(TaskStatus::Running);
        let mut done = Task::new("u1", "already finished", 1_000);
        done.set_status(TaskStatus::Done);

        checkpointer.append(&mut state, Event::TaskCreated { task: running.clone() }).expect("append");
        checkpointer.append(&mut state, Event::TaskCreated { task: done.clone() }).expect("append");

        let (running_id, done_id) = (running.id, done.id);
        drop(checkpointer);

        let (_checkpointer, state) = recover(&config).expect("recover");
        assert_eq!(state.get_task(&running_id).unwrap().status, TaskStatus::Crashed);
        assert_eq!(state.get_task(&done_id).unwrap().status, TaskStatus::Done);
    }
}

#[test]
fn recover_on_an_empty_state_dir_returns_empty_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());
    prepare_directories(&config).expect("prepare directories");

    let (_checkpointer, state) = recover(&config).expect("recover");
    assert!(state.tasks.is_empty());
}
