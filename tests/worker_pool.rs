// tests/worker_pool.rs

mod common;
use crate::common::{FakeRunner, RecordingNotifier, Script, init_tracing, with_timeout};

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use terrapolice::engine::WorkerPool;
use terrapolice::exec::{ExitState, OutputLine, RunContext};
use terrapolice::notify::Notifier;
use terrapolice::types::{CommandKind, Directory, Status};

fn dirs(n: usize) -> Vec<Directory> {
    (0..n).map(|i| Directory::new(format!("/infra/d{i}"))).collect()
}

fn pool(concurrency: usize, runner: Arc<FakeRunner>, notifier: Option<Arc<dyn Notifier>>) -> WorkerPool {
    WorkerPool::new(concurrency, runner, notifier, CancellationToken::new())
}

#[tokio::test]
async fn init_failure_skips_plan_but_not_other_directories() {
    init_tracing();
    let directories = dirs(4);
    let runner = FakeRunner::new()
        .script(&directories[1], CommandKind::Init, Script::fail(1, "Error: backend init failed"))
        .into_arc();

    let cx = RunContext::with_timeout(&CancellationToken::new(), Duration::from_secs(10));
    let (tx, _rx) = mpsc::channel::<OutputLine>(64);
    let reports = with_timeout(pool(1, runner.clone(), None).run(directories.clone(), &cx, tx)).await;

    assert_eq!(reports.len(), 4);
    assert_eq!(runner.invocations_for(&directories[1]), vec![CommandKind::Init]);
    for d in [&directories[0], &directories[2], &directories[3]] {
        assert_eq!(runner.invocations_for(d), vec![CommandKind::Init, CommandKind::Plan]);
    }

    let failed = reports.iter().find(|r| r.directory == directories[1]).unwrap();
    assert!(failed.plan.is_none());
    assert_eq!(failed.status(), Status::Error);
}

#[tokio::test]
async fn plan_failure_moves_on_to_next_directory() {
    let directories = dirs(3);
    let runner = FakeRunner::new()
        .script(&directories[0], CommandKind::Plan, Script::fail(1, "Error: invalid reference"))
        .into_arc();

    let cx = RunContext::with_timeout(&CancellationToken::new(), Duration::from_secs(10));
    let (tx, _rx) = mpsc::channel::<OutputLine>(64);
    let reports = with_timeout(pool(1, runner.clone(), None).run(directories.clone(), &cx, tx)).await;

    assert_eq!(reports.len(), 3);
    assert_eq!(runner.invocations().len(), 6);
}

#[tokio::test]
async fn concurrency_ceiling_is_respected() {
    init_tracing();
    let runner = FakeRunner::new()
        .with_default_delay(Duration::from_millis(30))
        .into_arc();

    let cx = RunContext::with_timeout(&CancellationToken::new(), Duration::from_secs(10));
    let (tx, _rx) = mpsc::channel::<OutputLine>(64);
    let reports = with_timeout(pool(3, runner.clone(), None).run(dirs(12), &cx, tx)).await;

    assert_eq!(reports.len(), 12);
    assert_eq!(runner.invocations().len(), 24);
    assert_eq!(runner.max_in_flight(), 3);
}

#[tokio::test]
async fn notifications_follow_classification() {
    let directories = dirs(2);
    let runner = FakeRunner::new()
        .script(&directories[0], CommandKind::Plan, Script::ok("No changes. Your infrastructure matches the configuration."))
        .script(&directories[1], CommandKind::Init, Script::start_failure("No such file or directory"))
        .into_arc();
    let notifier = RecordingNotifier::new();

    let cx = RunContext::with_timeout(&CancellationToken::new(), Duration::from_secs(10));
    let (tx, _rx) = mpsc::channel::<OutputLine>(64);
    let notifier_arc: Arc<dyn Notifier> = Arc::new(notifier.clone());
    with_timeout(pool(2, runner, Some(notifier_arc)).run(directories.clone(), &cx, tx)).await;

    let requests = notifier.requests();
    // Successful init of d0 is not reported; its plan and d1's init are.
    assert_eq!(requests.len(), 2);

    let d0 = requests.iter().find(|r| r.directory == directories[0]).unwrap();
    assert_eq!((d0.command, d0.status), (CommandKind::Plan, Status::Success));

    let d1 = requests.iter().find(|r| r.directory == directories[1]).unwrap();
    assert_eq!((d1.command, d1.status), (CommandKind::Init, Status::Error));
    assert_eq!(d1.output, "No such file or directory");
}

#[tokio::test]
async fn deadline_turns_remaining_work_into_timeouts() {
    init_tracing();
    let runner = FakeRunner::new()
        .with_default_delay(Duration::from_secs(30))
        .into_arc();

    let cx = RunContext::with_timeout(&CancellationToken::new(), Duration::from_millis(100));
    let (tx, _rx) = mpsc::channel::<OutputLine>(64);
    let reports = with_timeout(pool(2, runner.clone(), None).run(dirs(5), &cx, tx)).await;

    assert_eq!(reports.len(), 5);
    for report in &reports {
        assert_eq!(report.init.exit, ExitState::TimedOut);
        assert!(report.plan.is_none());
        assert!(report.timed_out());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn invocation_count_and_ceiling_hold(
        n in 1usize..16,
        concurrency in 1usize..6,
        failing in proptest::collection::vec(any::<bool>(), 16),
    ) {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .enable_all()
            .build()
            .unwrap();

        let directories = dirs(n);
        let mut runner = FakeRunner::new().with_default_delay(Duration::from_millis(2));
        for (i, d) in directories.iter().enumerate() {
            if failing[i] {
                runner = runner.script(d, CommandKind::Init, Script::fail(1, "init failed"));
            }
        }
        let runner = runner.into_arc();

        let reports = rt.block_on(async {
            let cx = RunContext::with_timeout(&CancellationToken::new(), Duration::from_secs(30));
            let (tx, _rx) = mpsc::channel::<OutputLine>(1024);
            pool(concurrency, runner.clone(), None).run(directories.clone(), &cx, tx).await
        });

        let invocations = runner.invocations();
        prop_assert_eq!(reports.len(), n);
        prop_assert!(invocations.len() >= n && invocations.len() <= 2 * n);
        prop_assert!(runner.max_in_flight() <= concurrency);

        for (i, d) in directories.iter().enumerate() {
            let kinds = runner.invocations_for(d);
            if failing[i] {
                prop_assert_eq!(kinds, vec![CommandKind::Init]);
            } else {
                prop_assert_eq!(kinds, vec![CommandKind::Init, CommandKind::Plan]);
            }
        }
    }
}
