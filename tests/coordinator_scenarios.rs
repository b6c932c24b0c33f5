// tests/coordinator_scenarios.rs

mod common;
use crate::common::{
    ConfigFileBuilder, FakeRunner, RecordingNotifier, Script, SharedBuffer, init_tracing,
    with_timeout,
};

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use terrapolice::engine::Coordinator;
use terrapolice::exec::ExitState;
use terrapolice::notify::Notifier;
use terrapolice::types::{CommandKind, Directory, Status};

const NO_CHANGES: &str = "No changes. Your infrastructure matches the configuration.";

/// A = no changes, B = pending changes, C = plan exits non-zero.
#[tokio::test]
async fn three_directories_are_classified_and_notified() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .base_directory("/infra")
        .with_directory("a")
        .with_directory("b")
        .with_directory("c")
        .concurrency(10)
        .build();

    let a = Directory::new("/infra/a");
    let b = Directory::new("/infra/b");
    let c = Directory::new("/infra/c");

    let runner = FakeRunner::new()
        .script(&a, CommandKind::Plan, Script::ok(NO_CHANGES))
        .script(&b, CommandKind::Plan, Script::ok("Plan: 2 to add, 0 to change, 0 to destroy."))
        .script(&c, CommandKind::Plan, Script::fail(1, "Error: Unsupported argument"))
        .into_arc();
    let notifier = RecordingNotifier::new();
    let notifier_arc: Arc<dyn Notifier> = Arc::new(notifier.clone());
    let out = SharedBuffer::new();

    let report = with_timeout(
        Coordinator::new(cfg, runner.clone(), Some(notifier_arc), CancellationToken::new())
            .run(out.clone()),
    )
    .await;

    assert_eq!(report.find(&a).unwrap().status(), Status::Success);
    assert_eq!(report.find(&b).unwrap().status(), Status::DiffDetected);
    assert_eq!(report.find(&c).unwrap().status(), Status::Error);
    assert_eq!(report.invocations(), 6);

    let mut statuses = notifier.statuses();
    statuses.sort_by_key(|s| s.as_str());
    assert_eq!(statuses, vec![Status::DiffDetected, Status::Error, Status::Success]);

    let c_request = notifier
        .requests()
        .into_iter()
        .find(|r| r.directory == c)
        .unwrap();
    assert_eq!(c_request.output, "Error: Unsupported argument");

    // Every forwarded line reached the sink before it closed.
    assert_eq!(report.lines, 3);
    let printed = out.lines();
    assert!(printed.contains(&format!("/infra/a [stdout]: {NO_CHANGES}")));
    assert!(printed.contains(&"/infra/c [stderr]: Error: Unsupported argument".to_string()));
}

#[tokio::test]
async fn notifications_disabled_sends_nothing() {
    let cfg = ConfigFileBuilder::new()
        .base_directory("/infra")
        .with_directory("a")
        .build();
    let runner = FakeRunner::new().into_arc();

    let report = with_timeout(
        Coordinator::new(cfg, runner, None, CancellationToken::new()).run(SharedBuffer::new()),
    )
    .await;

    assert_eq!(report.directories.len(), 1);
    assert_eq!(report.count(Status::DiffDetected), 1);
}

#[tokio::test]
async fn failing_notifier_does_not_stop_the_pass() {
    let cfg = ConfigFileBuilder::new()
        .base_directory("/infra")
        .with_directory("a")
        .with_directory("b")
        .with_directory("c")
        .concurrency(1)
        .build();
    let runner = FakeRunner::new().into_arc();
    let notifier = RecordingNotifier::failing();
    let notifier_arc: Arc<dyn Notifier> = Arc::new(notifier.clone());

    let report = with_timeout(
        Coordinator::new(cfg, runner.clone(), Some(notifier_arc), CancellationToken::new())
            .run(SharedBuffer::new()),
    )
    .await;

    assert_eq!(report.directories.len(), 3);
    assert_eq!(runner.invocations().len(), 6);
    assert_eq!(notifier.requests().len(), 3);
}

#[tokio::test]
async fn pass_completes_when_deadline_cuts_commands_short() {
    init_tracing();
    let cfg = ConfigFileBuilder::new()
        .base_directory("/infra")
        .with_directory("slow")
        .with_directory("fast")
        .timeout(Duration::from_millis(200))
        .build();

    let slow = Directory::new("/infra/slow");
    let runner = FakeRunner::new()
        .script(&slow, CommandKind::Plan, Script::ok(NO_CHANGES).delayed(Duration::from_secs(30)))
        .into_arc();
    let notifier = RecordingNotifier::new();
    let notifier_arc: Arc<dyn Notifier> = Arc::new(notifier.clone());

    let started = Instant::now();
    let report = with_timeout(
        Coordinator::new(cfg, runner, Some(notifier_arc), CancellationToken::new())
            .run(SharedBuffer::new()),
    )
    .await;
    assert!(started.elapsed() < Duration::from_secs(5));

    let slow_report = report.find(&slow).unwrap();
    assert_eq!(slow_report.plan.as_ref().unwrap().exit, ExitState::TimedOut);
    assert!(slow_report.timed_out());
    assert_eq!(slow_report.status(), Status::Error);

    let timed_out = notifier
        .requests()
        .into_iter()
        .find(|r| r.directory == slow)
        .unwrap();
    assert!(timed_out.timed_out);
    assert_eq!(timed_out.status, Status::Error);
}

#[tokio::test]
async fn summary_lists_every_directory() {
    let cfg = ConfigFileBuilder::new()
        .base_directory("/infra")
        .with_directory("a")
        .with_directory("b")
        .build();
    let b = Directory::new("/infra/b");
    let runner = FakeRunner::new()
        .script(&b, CommandKind::Init, Script::fail(1, "no backend"))
        .into_arc();

    let report = with_timeout(
        Coordinator::new(cfg, runner, None, CancellationToken::new()).run(SharedBuffer::new()),
    )
    .await;

    let mut summary = Vec::new();
    report.write_summary(&mut summary).unwrap();
    let summary = String::from_utf8(summary).unwrap();

    assert!(summary.contains("2 directories"));
    assert!(summary.contains("/infra/b (init exit 1, plan skipped)"));
    assert!(summary.contains("success: 0, diff_detected: 1, error: 1"));
}

#[cfg(unix)]
mod end_to_end {
    use super::*;
    use crate::common::{FAKE_TOOL, FakeProject};

    #[tokio::test]
    async fn real_processes_follow_the_same_contract() {
        init_tracing();
        let root = tempfile::tempdir().unwrap();

        let a = FakeProject::new(root.path(), "a").plan_script(&format!("echo '{NO_CHANGES}'"));
        let b = FakeProject::new(root.path(), "b").plan_script("echo 'Plan: 1 to add'");
        let c = FakeProject::new(root.path(), "c").plan_script("echo 'Error: boom' >&2\nexit 1");
        let d = FakeProject::new(root.path(), "d").init_script("echo 'Error: no backend' >&2\nexit 1");

        let cfg = ConfigFileBuilder::new()
            .base_directory(root.path())
            .with_directory("a")
            .with_directory("b")
            .with_directory("c")
            .with_directory("d")
            .with_directory("missing")
            .tool(FAKE_TOOL)
            .concurrency(2)
            .build();

        let runner = Arc::new(terrapolice::exec::ProcessRunner::new(FAKE_TOOL));
        let notifier = RecordingNotifier::new();
        let notifier_arc: Arc<dyn Notifier> = Arc::new(notifier.clone());
        let out = SharedBuffer::new();

        let report = with_timeout(
            Coordinator::new(cfg, runner, Some(notifier_arc), CancellationToken::new())
                .run(out.clone()),
        )
        .await;

        let status_of = |p: &FakeProject| report.find(&Directory::new(p.path())).unwrap().status();
        assert_eq!(status_of(&a), Status::Success);
        assert_eq!(status_of(&b), Status::DiffDetected);
        assert_eq!(status_of(&c), Status::Error);
        assert_eq!(status_of(&d), Status::Error);

        let missing = report
            .find(&Directory::new(root.path().join("missing")))
            .unwrap();
        assert!(matches!(missing.init.exit, ExitState::StartFailed(_)));
        assert!(missing.plan.is_none());

        assert_eq!(d.invocations(), vec!["init"]);
        assert_eq!(a.invocations(), vec!["init", "plan"]);

        // a, b, c plans + d init + missing init.
        assert_eq!(notifier.requests().len(), 5);

        let printed = out.contents();
        assert!(printed.contains(&format!("{} [stdout]: {NO_CHANGES}", a.path().display())));
        assert!(printed.contains(&format!("{} [stderr]: Error: boom", c.path().display())));
    }

    #[tokio::test]
    async fn real_process_timeout_still_completes_the_pass() {
        let root = tempfile::tempdir().unwrap();
        let slow = FakeProject::new(root.path(), "slow").plan_script("exec sleep 30");
        let fast = FakeProject::new(root.path(), "fast").plan_script(&format!("echo '{NO_CHANGES}'"));

        let cfg = ConfigFileBuilder::new()
            .base_directory(root.path())
            .with_directory("fast")
            .with_directory("slow")
            .tool(FAKE_TOOL)
            .timeout(Duration::from_secs(1))
            .build();

        let runner = Arc::new(terrapolice::exec::ProcessRunner::new(FAKE_TOOL));
        let started = Instant::now();
        let report = with_timeout(
            Coordinator::new(cfg, runner, None, CancellationToken::new()).run(SharedBuffer::new()),
        )
        .await;
        assert!(started.elapsed() < Duration::from_secs(10));

        let slow_report = report.find(&Directory::new(slow.path())).unwrap();
        assert!(slow_report.timed_out());
        assert_eq!(
            report.find(&Directory::new(fast.path())).unwrap().status(),
            Status::Success
        );
    }
}
