use super::*;
use crate::credential_store::MemoryCredentialStore;
use crate::test_support::{api_task, FakeApi};
use std::time::Duration;

fn signed_in_session() -> Arc<Session> {
    Arc::new(Session::new(Arc::new(
        MemoryCredentialStore::with_credential(Credential::from_login("a@b.com", "secret")),
    )))
}

fn sync_with(api: &Arc<FakeApi>) -> Arc<TaskSync> {
    Arc::new(TaskSync::new(signed_in_session(), api.clone()))
}

fn done_of(sync: &TaskSync, id: &str) -> bool {
    sync.task(id).expect("task listed").done
}

fn server_error() -> AppError {
    AppError::Server {
        status: 500,
        message: "Internal Server Error".to_string(),
    }
}

async fn wait_for_calls(api: &FakeApi, expected: usize) {
    for _ in 0..200 {
        if api.calls() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("expected {expected} api calls, saw {:?}", api.call_log());
}

#[tokio::test]
async fn load_maps_single_record_to_pending_task() {
    let api = Arc::new(FakeApi::with_tasks(vec![api_task(
        "1",
        "Take pill",
        "2024-01-01",
    )]));
    let sync = sync_with(&api);

    assert_eq!(sync.mount().await.expect("mount"), 1);
    assert_eq!(
        sync.tasks().as_slice(),
        &[Task {
            id: "1".to_string(),
            description: "Take pill".to_string(),
            date: "2024-01-01".to_string(),
            done: false,
        }]
    );
}

#[tokio::test]
async fn load_replaces_never_merges() {
    let api = Arc::new(FakeApi::with_tasks(vec![
        api_task("1", "Take pill", "2024-01-01"),
        api_task("2", "Walk", "2024-01-01"),
    ]));
    let sync = sync_with(&api);
    sync.refresh().await.expect("first load");

    api.set_tasks(vec![api_task("3", "Drink water", "2024-01-02")]);
    sync.refresh().await.expect("second load");

    let tasks = sync.tasks();
    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["3"]);
    assert!(sync.task("1").is_none());
}

#[tokio::test]
async fn failed_load_keeps_previous_list() {
    let api = Arc::new(FakeApi::with_tasks(vec![api_task("1", "Take pill", "d")]));
    let sync = sync_with(&api);
    sync.refresh().await.expect("load");

    api.fail_list(AppError::Network("offline".to_string()));
    let err = sync.refresh().await.expect_err("offline");
    assert_eq!(err.code(), "NETWORK_ERROR");
    assert_eq!(sync.tasks().len(), 1);
}

#[tokio::test]
async fn mount_without_credential_prompts_relogin_and_skips_network() {
    let api = Arc::new(FakeApi::default());
    let session = Arc::new(Session::new(Arc::new(MemoryCredentialStore::default())));
    let sync = TaskSync::new(session, api.clone());

    let err = sync.mount().await.expect_err("no session");
    assert_eq!(err, AppError::Session(RELOGIN_FOR_TASKS_MESSAGE.to_string()));
    assert_eq!(api.calls(), 0);
}

#[tokio::test]
async fn toggle_without_credential_makes_zero_calls() {
    let api = Arc::new(FakeApi::default());
    let session = Arc::new(Session::new(Arc::new(MemoryCredentialStore::default())));
    let sync = TaskSync::new(session, api.clone());
    sync.list.replace(vec![Task::from(api_task("1", "Take pill", "d"))]);

    let err = sync.toggle_complete("1").await.expect_err("no session");
    assert_eq!(err.code(), "SESSION_ERROR");
    assert_eq!(api.calls(), 0);
    assert!(!done_of(&sync, "1"));
}

#[tokio::test]
async fn toggle_unknown_id_is_rejected_without_request() {
    let api = Arc::new(FakeApi::with_tasks(vec![api_task("1", "Take pill", "d")]));
    let sync = sync_with(&api);
    sync.refresh().await.expect("load");

    let err = sync.toggle_complete("missing").await.expect_err("unknown");
    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert_eq!(api.call_log(), vec!["GET /elderly/tasks/today"]);
}

#[tokio::test]
async fn failed_toggle_rolls_back_to_prior_value() {
    let api = Arc::new(FakeApi::with_tasks(vec![
        api_task("1", "Take pill", "d"),
        api_task("2", "Walk", "d"),
    ]));
    let sync = sync_with(&api);
    sync.refresh().await.expect("load");
    api.fail_complete("1", server_error());

    let before = sync.tasks();
    let err = sync.toggle_complete("1").await.expect_err("rollback");
    assert_eq!(err.status(), Some(500));
    assert_eq!(sync.tasks(), before);
    assert_eq!(
        api.call_log(),
        vec!["GET /elderly/tasks/today", "PUT /elderly/tasks/1"]
    );
}

#[tokio::test]
async fn rollback_restores_done_true_as_well() {
    let api = Arc::new(FakeApi::default());
    let sync = sync_with(&api);
    sync.list.replace(vec![Task {
        done: true,
        ..Task::from(api_task("1", "Take pill", "d"))
    }]);
    api.fail_complete("1", AppError::Network("offline".to_string()));

    sync.toggle_complete("1").await.expect_err("rollback");
    assert!(done_of(&sync, "1"));
}

#[tokio::test]
async fn successful_toggle_commits_and_reloads() {
    let api = Arc::new(FakeApi::with_tasks(vec![api_task("1", "Take pill", "d")]));
    let sync = sync_with(&api);
    sync.refresh().await.expect("load");

    let report = sync.toggle_complete("1").await.expect("toggle");
    assert_eq!(report.command.state, ToggleState::Committed);
    assert!(!report.command.previous_done);
    assert_eq!(report.reload, Ok(1));
    // The read model carries no completion flag, so the reload shows the task pending again.
    assert!(!done_of(&sync, "1"));
    assert_eq!(
        api.call_log(),
        vec![
            "GET /elderly/tasks/today",
            "PUT /elderly/tasks/1",
            "GET /elderly/tasks/today"
        ]
    );
}

#[tokio::test]
async fn reload_failure_after_commit_is_reported_separately() {
    let api = Arc::new(FakeApi::with_tasks(vec![api_task("1", "Take pill", "d")]));
    let sync = sync_with(&api);
    sync.refresh().await.expect("load");
    api.fail_list(AppError::Network("offline".to_string()));

    let report = sync.toggle_complete("1").await.expect("commit stands");
    assert_eq!(report.command.state, ToggleState::Committed);
    assert_eq!(report.reload.expect_err("reload").code(), "NETWORK_ERROR");
    assert!(done_of(&sync, "1"));
}

#[tokio::test]
async fn optimistic_flip_is_visible_before_network_resolves() {
    let api = Arc::new(FakeApi::with_tasks(vec![api_task("1", "Take pill", "d")]));
    let sync = sync_with(&api);
    sync.refresh().await.expect("load");
    api.gate("1");

    let handle = {
        let sync = Arc::clone(&sync);
        tokio::spawn(async move { sync.toggle_complete("1").await })
    };

    wait_for_calls(&api, 2).await;
    assert!(done_of(&sync, "1"));
    assert!(sync.is_toggle_in_flight("1"));

    api.release("1");
    let report = handle.await.expect("join").expect("toggle");
    assert_eq!(report.command.state, ToggleState::Committed);
    assert!(!sync.is_toggle_in_flight("1"));
}

#[tokio::test]
async fn abandoned_toggle_restores_prior_value() {
    let api = Arc::new(FakeApi::with_tasks(vec![api_task("1", "Take pill", "d")]));
    let sync = sync_with(&api);
    sync.refresh().await.expect("load");
    api.gate("1");

    let handle = {
        let sync = Arc::clone(&sync);
        tokio::spawn(async move { sync.toggle_complete("1").await })
    };

    wait_for_calls(&api, 2).await;
    assert!(done_of(&sync, "1"));

    handle.abort();
    let joined = handle.await;
    assert!(joined.expect_err("aborted").is_cancelled());
    assert!(!done_of(&sync, "1"));
    assert!(!sync.is_toggle_in_flight("1"));
}

async fn run_isolation_case(fail_first: bool) {
    let api = Arc::new(FakeApi::with_tasks(vec![
        api_task("a", "Take pill", "d"),
        api_task("b", "Walk", "d"),
    ]));
    let sync = sync_with(&api);
    sync.refresh().await.expect("load");
    api.fail_complete("a", server_error());
    api.gate("a");
    api.gate("b");

    let toggle_a = {
        let sync = Arc::clone(&sync);
        tokio::spawn(async move { sync.toggle_complete("a").await })
    };
    let toggle_b = {
        let sync = Arc::clone(&sync);
        tokio::spawn(async move { sync.toggle_complete("b").await })
    };

    wait_for_calls(&api, 3).await;
    assert!(done_of(&sync, "a"));
    assert!(done_of(&sync, "b"));

    let (result_a, result_b) = if fail_first {
        api.release("a");
        let a = toggle_a.await.expect("join a");
        api.release("b");
        let b = toggle_b.await.expect("join b");
        (a, b)
    } else {
        api.release("b");
        let b = toggle_b.await.expect("join b");
        api.release("a");
        let a = toggle_a.await.expect("join a");
        (a, b)
    };

    assert_eq!(result_a.expect_err("a fails").code(), "SERVER_ERROR");
    let report_b = result_b.expect("b succeeds");
    assert_eq!(report_b.command.state, ToggleState::Committed);
    assert_eq!(report_b.reload, Ok(2));

    assert!(!done_of(&sync, "a"), "a restored to its original state");
    assert!(!done_of(&sync, "b"), "b reflects the post-sync reload");
}

#[tokio::test]
async fn concurrent_toggles_are_isolated_when_failure_lands_first() {
    run_isolation_case(true).await;
}

#[tokio::test]
async fn concurrent_toggles_are_isolated_when_success_lands_first() {
    run_isolation_case(false).await;
}

#[tokio::test]
async fn same_id_toggles_are_serialized() {
    let api = Arc::new(FakeApi::with_tasks(vec![api_task("1", "Take pill", "d")]));
    let sync = sync_with(&api);
    sync.refresh().await.expect("load");
    api.fail_complete("1", server_error());
    api.gate("1");

    let first = {
        let sync = Arc::clone(&sync);
        tokio::spawn(async move { sync.toggle_complete("1").await })
    };
    wait_for_calls(&api, 2).await;

    let second = {
        let sync = Arc::clone(&sync);
        tokio::spawn(async move { sync.toggle_complete("1").await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;
    // The second tap waits for the first request; only one PUT is outstanding.
    assert_eq!(api.calls(), 2);
    assert!(done_of(&sync, "1"));

    api.release("1");
    first.await.expect("join").expect_err("first fails");
    wait_for_calls(&api, 3).await;
    assert!(done_of(&sync, "1"), "second toggle flipped from the restored value");

    api.release("1");
    second.await.expect("join").expect_err("second fails");
    assert!(!done_of(&sync, "1"));
}

#[test]
fn api_task_accepts_numeric_ids() {
    let parsed: Vec<ApiTask> =
        serde_json::from_str(r#"[{"id":7,"description":"Take pill","date":"2024-01-01"}]"#)
            .expect("parse");
    assert_eq!(parsed[0].id, "7");
}

#[test]
fn speech_text_joins_description_and_date() {
    let task = Task::from(api_task("1", "Take pill", "2024-01-01"));
    assert_eq!(task.speech_text(), "Take pill. 2024-01-01");
}
