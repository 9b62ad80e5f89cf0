//! Unit tests for `validate_plan` against a scripted cluster manager.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use surge_cli::application::services::plan_validation::validate_plan;
use surge_cli::domain::validate::CLUSTER_NOT_FOUND;

use crate::fakes::{FakeCluster, RUN_ID, plan};

#[tokio::test]
async fn test_valid_plan_is_accepted_unchanged() {
    let cluster = FakeCluster::new();

    let result = validate_plan(plan(), &cluster).await.unwrap();

    assert!(result.is_valid());
    assert_eq!(result.plan.run_id.as_deref(), Some(RUN_ID));
    assert_eq!(cluster.state().cluster_lookups, 1);
}

#[tokio::test]
async fn test_missing_run_id_is_generated() {
    let cluster = FakeCluster::new();
    let mut plan = plan();
    plan.run_id = None;

    let result = validate_plan(plan, &cluster).await.unwrap();

    assert!(result.is_valid());
    let run_id = result.plan.run_id.expect("generated");
    assert!(uuid::Uuid::parse_str(&run_id).is_ok(), "got: {run_id}");
}

#[tokio::test]
async fn test_empty_cluster_name_is_rejected() {
    let cluster = FakeCluster::new();
    let mut plan = plan();
    plan.cluster_name = String::new();

    let result = validate_plan(plan, &cluster).await.unwrap();

    assert_eq!(
        result.errors.field("cluster_name").unwrap_or_default(),
        ["Plan cluster_name missing".to_string()]
    );
    assert_eq!(cluster.state().cluster_lookups, 0);
}

#[tokio::test]
async fn test_step_name_too_long_for_family_with_longest_run_id() {
    let cluster = FakeCluster::new();
    let mut plan = plan();
    plan.steps[0].name = "s".repeat(200);
    plan.run_id = Some("r".repeat(64));

    let result = validate_plan(plan, &cluster).await.unwrap();

    assert!(!result.is_valid());
    assert_eq!(
        result.errors.step_field(0, "name").unwrap_or_default(),
        ["Step name too long".to_string()]
    );
}

#[tokio::test]
async fn test_invalid_characters_reported_once() {
    let cluster = FakeCluster::new();
    let mut plan = plan();
    plan.cluster_name = "*".to_string();

    let result = validate_plan(plan, &cluster).await.unwrap();

    assert_eq!(result.errors.field("cluster_name").unwrap_or_default().len(), 1);
    assert_eq!(cluster.state().cluster_lookups, 0);
}

#[tokio::test]
async fn test_overlong_cluster_name_is_rejected() {
    let cluster = FakeCluster::new();
    let mut plan = plan();
    plan.cluster_name = "a".repeat(512);

    let result = validate_plan(plan, &cluster).await.unwrap();

    assert_eq!(
        result.errors.field("cluster_name").unwrap_or_default(),
        ["Plan cluster_name too long".to_string()]
    );
}

#[tokio::test]
async fn test_nonexistent_cluster_is_one_top_level_error() {
    let cluster = FakeCluster::with(|s| s.exists = false);

    let result = validate_plan(plan(), &cluster).await.unwrap();

    assert!(!result.is_valid());
    assert_eq!(result.errors.message_count(), 1);
    assert_eq!(
        result.errors.field("cluster_name").unwrap_or_default(),
        [CLUSTER_NOT_FOUND.to_string()]
    );
}

#[tokio::test]
async fn test_rejected_plan_keeps_its_missing_run_id() {
    let cluster = FakeCluster::with(|s| s.exists = false);
    let mut plan = plan();
    plan.run_id = None;

    let result = validate_plan(plan, &cluster).await.unwrap();

    assert!(result.plan.run_id.is_none());
}

#[tokio::test]
async fn test_step_problems_are_reported_by_index() {
    let cluster = FakeCluster::new();
    let mut plan = plan();
    plan.steps[1].instance_count = 0;
    plan.steps[1].name = "late step".to_string();

    let result = validate_plan(plan, &cluster).await.unwrap();

    assert!(result.errors.field("cluster_name").unwrap_or_default().is_empty());
    assert_eq!(result.errors.step_field(1, "instance_count").unwrap_or_default().len(), 1);
    assert_eq!(
        result.errors.step_field(1, "name").unwrap_or_default(),
        ["Step name contains invalid characters".to_string()]
    );
    assert!(result.errors.step_field(0, "name").unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_lookup_failure_is_an_error() {
    struct Unreachable;

    impl surge_cli::application::ports::CapacityManager for Unreachable {
        async fn cluster_exists(&self, _cluster: &str) -> anyhow::Result<bool> {
            anyhow::bail!("helper timed out")
        }
        async fn query_active_instances(
            &self,
            _cluster: &str,
        ) -> anyhow::Result<surge_cli::domain::InstanceDemand> {
            unreachable!()
        }
        async fn request_instances(
            &self,
            _cluster: &str,
            _request: &surge_cli::application::ports::InstanceRequest,
        ) -> anyhow::Result<()> {
            unreachable!()
        }
        async fn has_metrics_node(&self, _cluster: &str) -> anyhow::Result<bool> {
            unreachable!()
        }
    }

    let err = validate_plan(plan(), &Unreachable).await.unwrap_err();

    assert!(format!("{err:#}").contains("helper timed out"));
}
