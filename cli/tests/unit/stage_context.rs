//! Unit tests for stage dispatch through `StageContext` and a full pass of
//! the pipeline against scripted collaborators.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use surge_cli::application::ports::{MetricSourceState, MetricsEndpoint, ServiceStatus};
use surge_cli::application::services::runner::StageContext;
use surge_cli::domain::{Directive, Outcome, Settings, Signal, Stage};
use surge_common::start_signal_key;

use crate::fakes::{FakeBlobStore, FakeCluster, FixedClock, RUN_ID, at, metrics_plan, plan};

fn settings() -> Settings {
    Settings {
        worker_security_group: Some("sg-workers".to_string()),
        ..Settings::default()
    }
}

#[tokio::test]
async fn test_dispatch_populate_passes_network_settings() {
    let cluster = FakeCluster::new();
    let blobs = FakeBlobStore::new();
    let clock = FixedClock(at(0));
    let settings = settings();
    let ctx = StageContext {
        cluster: &cluster,
        blobs: &blobs,
        clock: &clock,
        settings: &settings,
    };
    let mut plan = plan();

    let outcome = ctx
        .run(Stage::PopulateMissingInstances, &mut plan)
        .await
        .unwrap();

    assert!(outcome.is_done());
    let state = cluster.state();
    assert_eq!(
        state.requests[0].network.worker_security_group.as_deref(),
        Some("sg-workers")
    );
}

#[tokio::test]
async fn test_dispatch_cleanup_always_done() {
    let cluster = FakeCluster::with(|s| s.fail_stops = true);
    let blobs = FakeBlobStore::new();
    let clock = FixedClock(at(0));
    let settings = Settings::default();
    let ctx = StageContext {
        cluster: &cluster,
        blobs: &blobs,
        clock: &clock,
        settings: &settings,
    };

    let outcome = ctx.run(Stage::CleanupCluster, &mut plan()).await.unwrap();

    assert_eq!(outcome.directive(Stage::CleanupCluster), Directive::Advance);
}

#[tokio::test]
async fn test_dispatch_monitor_uses_configured_margin() {
    let cluster = FakeCluster::new();
    let blobs = FakeBlobStore::new();
    blobs.insert(&start_signal_key(RUN_ID), at(0));
    let clock = FixedClock(at(160));
    let settings = Settings {
        shutdown_margin_secs: 10,
        ..Settings::default()
    };
    let ctx = StageContext {
        cluster: &cluster,
        blobs: &blobs,
        clock: &clock,
        settings: &settings,
    };

    let outcome = ctx
        .run(Stage::CheckForClusterDone, &mut plan())
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Signal(Signal::ShutdownPlan(_))));
    assert_eq!(
        outcome.directive(Stage::CheckForClusterDone),
        Directive::Teardown
    );
}

/// Drive every stage in order, re-running a stage while it signals a retry
/// and updating the fakes the way real infrastructure would catch up.
#[tokio::test]
async fn test_full_pipeline_reaches_teardown() {
    let cluster = FakeCluster::new();
    let blobs = FakeBlobStore::new();
    let settings = Settings::default();
    let mut plan = metrics_plan();
    plan.run_id = None;

    let mut clock = FixedClock(at(0));
    let mut stage = Some(Stage::PopulateMissingInstances);
    let mut visited = Vec::new();

    while let Some(current) = stage {
        let ctx = StageContext {
            cluster: &cluster,
            blobs: &blobs,
            clock: &clock,
            settings: &settings,
        };
        let outcome = ctx.run(current, &mut plan).await.unwrap();
        let directive = outcome.directive(current);
        visited.push((current, directive));

        if directive == Directive::Retry {
            let mut state = cluster.state();
            match current {
                Stage::EnsureMetricsAvailable => {
                    state.metrics_service = Some(ServiceStatus {
                        desired: 1,
                        running: 1,
                    });
                    state.metrics_endpoint = Some(MetricsEndpoint {
                        address: Some("10.0.3.17".to_string()),
                        handle: "task/metrics-1".to_string(),
                    });
                }
                Stage::EnsureMetricSourcesCreated => {
                    state.source_state = MetricSourceState::Finished;
                }
                Stage::WaitForClusterReady => state.services_ready = true,
                Stage::CheckForClusterDone => {
                    drop(state);
                    clock = FixedClock(at(1_000));
                }
                Stage::CheckDrained => state.drained = true,
                _ => panic!("unexpected retry at {current}"),
            }
        }
        stage = directive.next_stage(current);
        assert!(visited.len() < 32, "pipeline did not settle: {visited:?}");
    }

    let stages: Vec<Stage> = visited.iter().map(|(s, _)| *s).collect();
    assert_eq!(stages.first(), Some(&Stage::PopulateMissingInstances));
    assert_eq!(stages.last(), Some(&Stage::CheckDrained));
    assert!(visited.contains(&(Stage::CheckForClusterDone, Directive::Teardown)));
    assert!(plan.run_id.is_some());
    assert_eq!(plan.metrics_sidecar_address.as_deref(), Some("10.0.3.17"));
    assert!(blobs.state().objects.is_empty());
    assert_eq!(cluster.state().requests.len(), 1);
}
