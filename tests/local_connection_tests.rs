//! Integration tests for the built-in local transport.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;

use serde_json::json;

use fleetrun::connection::LocalConnection;
use fleetrun::{Action, Host, Outcome, RunOptions, TaskDispatcher};

fn local_dispatcher(options: RunOptions) -> TaskDispatcher {
    let connection = Arc::new(LocalConnection::with_module_paths(
        options.module_paths.clone(),
    ));
    TaskDispatcher::new(options, connection)
}

#[tokio::test]
async fn shell_captures_stdout_and_return_code() {
    let dispatcher = local_dispatcher(RunOptions::new());
    let action = Action::new("shell").with_arg("cmd", "printf hello");

    let report = dispatcher.run(&[Host::new("h1")], &action).await.unwrap();

    assert_eq!(report.outcome_of("h1"), Some(Outcome::Ok));
    let payload = &report.results[0].payload;
    assert_eq!(payload["stdout"], json!("hello"));
    assert_eq!(payload["rc"], json!(0));
}

#[tokio::test]
async fn non_zero_exit_reports_failed_not_unreachable() {
    let dispatcher = local_dispatcher(RunOptions::new());
    let action = Action::new("command").with_arg("cmd", "exit 3");

    let report = dispatcher.run(&[Host::new("h1")], &action).await.unwrap();

    assert_eq!(report.outcome_of("h1"), Some(Outcome::Failed));
    assert_eq!(report.results[0].payload["rc"], json!(3));
    assert!(report.unreachable.is_empty());
}

#[tokio::test]
async fn check_mode_skips_execution() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("marker");

    let dispatcher = local_dispatcher(RunOptions::new().with_check_mode());
    let action = Action::new("shell").with_arg("cmd", format!("touch {}", marker.display()));

    let report = dispatcher.run(&[Host::new("h1")], &action).await.unwrap();

    assert_eq!(report.outcome_of("h1"), Some(Outcome::Ok));
    assert_eq!(report.results[0].payload["check_mode"], json!(true));
    assert!(!marker.exists(), "check mode must not run the command");
}

fn write_module(dir: &std::path::Path, name: &str, body: &str) {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
}

#[tokio::test]
async fn custom_modules_resolve_under_module_paths() {
    let dir = tempfile::tempdir().unwrap();
    write_module(
        dir.path(),
        "greet",
        "#!/bin/sh\nprintf '{\"greeting\": \"hello\", \"changed\": false}'\n",
    );

    let options = RunOptions::new().with_module_path(dir.path());
    let dispatcher = local_dispatcher(options);

    let report = dispatcher
        .run(&[Host::new("h1")], &Action::new("greet"))
        .await
        .unwrap();

    assert_eq!(report.outcome_of("h1"), Some(Outcome::Ok));
    assert_eq!(report.results[0].payload["greeting"], json!("hello"));
}

#[tokio::test]
async fn custom_module_failure_is_reported_as_failed() {
    let dir = tempfile::tempdir().unwrap();
    write_module(
        dir.path(),
        "flaky",
        "#!/bin/sh\nprintf '{\"msg\": \"nope\"}'\nexit 2\n",
    );

    let options = RunOptions::new().with_module_path(dir.path());
    let dispatcher = local_dispatcher(options);

    let report = dispatcher
        .run(&[Host::new("h1")], &Action::new("flaky"))
        .await
        .unwrap();

    assert_eq!(report.outcome_of("h1"), Some(Outcome::Failed));
    assert_eq!(report.results[0].payload["rc"], json!(2));
}

#[tokio::test]
async fn module_arguments_arrive_as_json_argv() {
    let dir = tempfile::tempdir().unwrap();
    // Echo the raw argv back so the test can inspect what the module saw.
    write_module(
        dir.path(),
        "echo_args",
        "#!/bin/sh\nprintf '{\"received\": %s}' \"$1\"\n",
    );

    let options = RunOptions::new().with_module_path(dir.path());
    let dispatcher = local_dispatcher(options);
    let action = Action::new("echo_args").with_arg("name", "fleet");

    let report = dispatcher.run(&[Host::new("h1")], &action).await.unwrap();

    assert_eq!(
        report.results[0].payload["received"],
        json!({"name": "fleet"})
    );
}
