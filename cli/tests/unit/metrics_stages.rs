//! Unit tests for the metrics sidecar stages.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use surge_cli::application::ports::{MetricSourceState, MetricsEndpoint, ServiceStatus};
use surge_cli::application::services::runner::{
    ensure_metric_sources_created, ensure_metrics_available,
};
use surge_cli::domain::{Outcome, Signal};
use surge_common::DashboardOptions;

use crate::fakes::{FakeCluster, RUN_ID, metrics_plan, plan};

const BUCKET: &str = "surge-dashboards";

fn endpoint(address: Option<&str>) -> MetricsEndpoint {
    MetricsEndpoint {
        address: address.map(str::to_string),
        handle: "task/metrics-1".to_string(),
    }
}

// ============================================================================
// ensure_metrics_available
// ============================================================================

#[tokio::test]
async fn test_metrics_disabled_is_done_without_side_effects() {
    let cluster = FakeCluster::new();
    let mut plan = plan();

    let outcome = ensure_metrics_available(&mut plan, &cluster).await.unwrap();

    assert_eq!(outcome, Outcome::Done);
    let state = cluster.state();
    assert_eq!(state.metrics_services_created, 0);
    assert!(plan.metrics_sidecar_address.is_none());
}

#[tokio::test]
async fn test_absent_metrics_service_is_created() {
    let cluster = FakeCluster::new();
    let mut plan = metrics_plan();

    let outcome = ensure_metrics_available(&mut plan, &cluster).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::Signal(Signal::ServicesStarting("Triggered metrics start".to_string()))
    );
    assert_eq!(cluster.state().metrics_services_created, 1);
}

#[tokio::test]
async fn test_metrics_service_still_starting() {
    let cluster = FakeCluster::with(|s| {
        s.metrics_service = Some(ServiceStatus {
            desired: 1,
            running: 0,
        });
    });
    let mut plan = metrics_plan();

    let outcome = ensure_metrics_available(&mut plan, &cluster).await.unwrap();

    let Outcome::Signal(Signal::ServicesStarting(message)) = outcome else {
        panic!("expected ServicesStarting, got {outcome:?}");
    };
    assert!(message.contains("0 of 1"), "got: {message}");
    assert_eq!(cluster.state().metrics_services_created, 0);
}

#[tokio::test]
async fn test_steady_service_without_address_is_fatal() {
    let cluster = FakeCluster::with(|s| {
        s.metrics_service = Some(ServiceStatus {
            desired: 1,
            running: 1,
        });
        s.metrics_endpoint = Some(endpoint(None));
    });
    let mut plan = metrics_plan();

    let err = ensure_metrics_available(&mut plan, &cluster)
        .await
        .unwrap_err()
        .to_string();

    assert!(err.contains("Unable to locate metrics address"), "got: {err}");
    assert!(plan.metrics_sidecar_address.is_none());
}

#[tokio::test]
async fn test_steady_service_without_container_is_fatal() {
    let cluster = FakeCluster::with(|s| {
        s.metrics_service = Some(ServiceStatus {
            desired: 1,
            running: 1,
        });
    });
    let mut plan = metrics_plan();

    assert!(ensure_metrics_available(&mut plan, &cluster).await.is_err());
}

#[tokio::test]
async fn test_steady_service_records_address_on_plan() {
    let cluster = FakeCluster::with(|s| {
        s.metrics_service = Some(ServiceStatus {
            desired: 1,
            running: 1,
        });
        s.metrics_endpoint = Some(endpoint(Some("10.0.3.17")));
    });
    let mut plan = metrics_plan();

    let outcome = ensure_metrics_available(&mut plan, &cluster).await.unwrap();

    assert!(outcome.is_done());
    assert_eq!(plan.metrics_sidecar_address.as_deref(), Some("10.0.3.17"));
    assert_eq!(plan.metric_source_handle.as_deref(), Some("task/metrics-1"));
}

// ============================================================================
// ensure_metric_sources_created
// ============================================================================

fn located_plan() -> surge_common::Plan {
    let mut plan = metrics_plan();
    plan.metrics_sidecar_address = Some("10.0.3.17".to_string());
    plan.metric_source_handle = Some("task/metrics-1".to_string());
    plan
}

#[tokio::test]
async fn test_sources_disabled_is_done() {
    let cluster = FakeCluster::new();

    let outcome = ensure_metric_sources_created(&plan(), &cluster, BUCKET)
        .await
        .unwrap();

    assert!(outcome.is_done());
    assert!(cluster.state().source_requests.is_empty());
}

#[tokio::test]
async fn test_sources_not_started_are_created() {
    let cluster = FakeCluster::new();
    let mut plan = located_plan();
    plan.metrics_options.dashboard = Some(DashboardOptions {
        admin_user: "admin".to_string(),
        admin_password: "hunter2".to_string(),
        name: "Push".to_string(),
        filename: "push.json".to_string(),
    });

    let outcome = ensure_metric_sources_created(&plan, &cluster, BUCKET)
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        Outcome::Signal(Signal::CreatingMetricSource(_))
    ));
    let state = cluster.state();
    assert_eq!(state.source_requests.len(), 1);
    let request = &state.source_requests[0];
    assert_eq!(request.run_id, RUN_ID);
    assert_eq!(request.database, surge_common::metrics_database_name(RUN_ID));
    assert_eq!(request.sidecar_address, "10.0.3.17");
    assert_eq!(request.bucket, BUCKET);
    assert_eq!(
        request.dashboard.as_ref().map(|d| d.filename.as_str()),
        Some("push.json")
    );
}

#[tokio::test]
async fn test_sources_in_progress_wait() {
    let cluster = FakeCluster::with(|s| s.source_state = MetricSourceState::InProgress);

    let outcome = ensure_metric_sources_created(&located_plan(), &cluster, BUCKET)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Signal(Signal::CreatingMetricSource(
            "Waiting for metric sources".to_string()
        ))
    );
    assert!(cluster.state().source_requests.is_empty());
}

#[tokio::test]
async fn test_sources_finished_is_done() {
    let cluster = FakeCluster::with(|s| s.source_state = MetricSourceState::Finished);

    let outcome = ensure_metric_sources_created(&located_plan(), &cluster, BUCKET)
        .await
        .unwrap();

    assert!(outcome.is_done());
    assert!(cluster.state().source_requests.is_empty());
}

#[tokio::test]
async fn test_sources_are_triggered_once() {
    let cluster = FakeCluster::new();
    let plan = located_plan();

    ensure_metric_sources_created(&plan, &cluster, BUCKET)
        .await
        .unwrap();
    let second = ensure_metric_sources_created(&plan, &cluster, BUCKET)
        .await
        .unwrap();

    assert_eq!(
        second,
        Outcome::Signal(Signal::CreatingMetricSource(
            "Waiting for metric sources".to_string()
        ))
    );
    assert_eq!(cluster.state().source_requests.len(), 1);
}

#[tokio::test]
async fn test_sources_without_sidecar_address_is_fatal() {
    let cluster = FakeCluster::new();

    let err = ensure_metric_sources_created(&metrics_plan(), &cluster, BUCKET)
        .await
        .unwrap_err()
        .to_string();

    assert!(err.contains("sidecar address"), "got: {err}");
    assert!(cluster.state().source_requests.is_empty());
}
