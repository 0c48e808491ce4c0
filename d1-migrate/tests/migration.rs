use std::path::Path;

use d1_migrate::migration::MigrationMapping;
use d1_migrate::mock::{MockSupabase, MockWorker};
use d1_migrate::models::SourceTable;
use d1_migrate::worker::writer::{
    GOALS_PATH, HABITS_PATH, HABIT_LOGS_PATH, JOURNAL_PATH, PROFILE_PATH, TASKS_PATH,
};
use d1_migrate::{MigrationConfig, MigrationError, MigrationExecutor};
use reqwest::Method;
use serde_json::json;

fn config_in(dir: &Path) -> MigrationConfig {
    MigrationConfig {
        output_dir: dir.join("backup"),
        ..MigrationConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn single_user_single_task() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockSupabase::new();
    source.register_table("users", json!([{"id": "u1", "telegram_id": 555}]));
    source.register_table(
        "tasks",
        json!([{"user_id": "u1", "title": "Buy milk", "is_completed": true}]),
    );

    let worker = MockWorker::new();
    worker.respond(PROFILE_PATH, json!({"telegram_id": "555"}));
    worker.respond(TASKS_PATH, json!([{"id": "t1"}]));

    let executor = MigrationExecutor::new(source, worker, config_in(dir.path()));
    let summary = executor.execute().await.unwrap();

    let calls = executor.worker().calls();
    assert_eq!(calls.len(), 2);

    assert_eq!(calls[0].method, Method::PUT);
    assert_eq!(calls[0].path, PROFILE_PATH);
    assert_eq!(calls[0].user_id, "555");

    assert_eq!(calls[1].method, Method::POST);
    assert_eq!(calls[1].path, TASKS_PATH);
    assert_eq!(calls[1].user_id, "555");
    assert_eq!(
        calls[1].body,
        json!([{
            "title": "Buy milk",
            "date": "",
            "is_completed": 1,
            "is_important": 0,
            "has_notification": 0,
            "notification_time": null,
            "recurrence_rule": null,
        }])
    );

    assert_eq!(summary.users.imported, 1);
    assert_eq!(summary.tasks.imported, 1);
    assert_eq!(summary.mapped_users, 1);

    for table in SourceTable::ALL {
        assert_eq!(executor.source().fetch_count(table.as_str()), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn full_run_remaps_habits_and_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockSupabase::new();
    source.register_table(
        "users",
        json!([
            {"id": "u1", "telegram_id": 555, "first_name": "Ann"},
            {"id": "u2", "telegram_id": null},
        ]),
    );
    source.register_table(
        "habits",
        json!([
            {"id": "h1", "user_id": "u1", "title": "Walk", "recurrence_rule": "{\"type\":\"daily\"}"},
        ]),
    );
    source.register_table(
        "habit_logs",
        json!([
            {"user_id": "u1", "habit_id": "h1", "completed_at": "2025-03-01T08:00:00Z"},
            {"user_id": "u1", "habit_id": "h2", "completed_at": "2025-03-02T08:00:00Z"},
        ]),
    );
    source.register_table(
        "journal",
        json!([{"user_id": "u1", "type": "gratitude", "content": "Coffee", "date": "2025-03-01"}]),
    );
    source.register_table(
        "goals",
        json!([{"user_id": "u-gone", "title": "Read 20 books", "description": null}]),
    );

    let worker = MockWorker::new();
    worker.respond(PROFILE_PATH, json!({"telegram_id": "555"}));
    worker.respond(HABITS_PATH, json!({"id": "d1-h1", "title": "Walk"}));
    worker.respond(HABIT_LOGS_PATH, json!({"id": "d1-l1"}));
    worker.respond(JOURNAL_PATH, json!({"id": "d1-j1"}));
    worker.respond(GOALS_PATH, json!({"id": "d1-g1"}));

    let config = config_in(dir.path());
    let executor = MigrationExecutor::new(source, worker, config.clone());
    let summary = executor.execute().await.unwrap();

    // Dependency order across steps
    let paths: Vec<String> = executor
        .worker()
        .calls()
        .into_iter()
        .map(|call| call.path)
        .collect();
    assert_eq!(
        paths,
        vec![PROFILE_PATH, HABITS_PATH, HABIT_LOGS_PATH, JOURNAL_PATH, GOALS_PATH]
    );

    let habit = &executor.worker().calls_to(HABITS_PATH)[0];
    assert_eq!(habit.body["recurrence_rule"], json!({"type": "daily"}));
    assert_eq!(habit.body["icon"], json!("⭐"));

    let logs = executor.worker().calls_to(HABIT_LOGS_PATH);
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].body["habit_id"], json!("d1-h1"));

    let goal = &executor.worker().calls_to(GOALS_PATH)[0];
    assert_eq!(goal.user_id, "u-gone");
    assert_eq!(goal.body["year"], json!(2026));

    assert_eq!(summary.users.skipped, 1);
    assert_eq!(summary.habit_logs.skipped, 1);
    assert_eq!(summary.habit_logs.imported, 1);
    assert_eq!(summary.mapped_habits, 1);

    for table in SourceTable::ALL {
        assert!(config.snapshot_path(table.as_str()).exists());
    }

    let mapping = MigrationMapping::read(&config.mapping_path()).await.unwrap();
    assert_eq!(mapping.uuid_to_telegram.get("u1").map(String::as_str), Some("555"));
    assert_eq!(mapping.uuid_to_telegram.len(), 1);
    assert_eq!(mapping.old_habit_to_new.get("h1").map(String::as_str), Some("d1-h1"));
}

#[tokio::test(start_paused = true)]
async fn failed_export_and_rejected_records_do_not_abort() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockSupabase::new();
    source.register_table("users", json!([{"id": "u1", "telegram_id": 555}]));
    source.fail_table("tasks");
    source.register_table("goals", json!([{"user_id": "u1", "title": "Ship it"}]));

    let worker = MockWorker::new();
    worker.fail(PROFILE_PATH);
    worker.respond(GOALS_PATH, json!({"id": "g1"}));

    let executor = MigrationExecutor::new(source, worker, config_in(dir.path()));
    let summary = executor.execute().await.unwrap();

    assert_eq!(summary.users.failed, 1);
    assert_eq!(summary.tasks.attempted, 0);
    assert_eq!(summary.goals.imported, 1);
    assert!(summary.exported.contains(&(SourceTable::Tasks, 0)));
    assert!(executor.worker().calls_to(TASKS_PATH).is_empty());
}

#[tokio::test(start_paused = true)]
async fn missing_required_field_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockSupabase::new();
    source.register_table("tasks", json!([{"title": "orphan"}]));

    let executor = MigrationExecutor::new(source, MockWorker::new(), config_in(dir.path()));
    let err = executor.execute().await.unwrap_err();

    assert!(matches!(
        err,
        MigrationError::MissingField { table: "tasks", field: "user_id" }
    ));
    assert!(!config_in(dir.path()).mapping_path().exists());
}
