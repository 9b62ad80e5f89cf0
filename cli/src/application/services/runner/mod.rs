//! Plan execution runner: one idempotent entry point per pipeline stage.
//!
//! Every stage re-derives its decision from freshly queried collaborator
//! state and reports back through [`Outcome`]; none of them waits or polls
//! on its own. Each module imports only from `crate::domain` and
//! `crate::application::ports`.

pub mod metrics;
pub mod monitor;
pub mod provision;
pub mod rollout;
pub mod teardown;

use anyhow::{Context, Result};
use surge_common::Plan;

use crate::application::ports::{BlobStore, Clock, ClusterManager};
use crate::domain::{Outcome, Settings, Stage};

pub use metrics::{ensure_metric_sources_created, ensure_metrics_available};
pub use monitor::check_for_cluster_done;
pub use provision::populate_missing_instances;
pub use rollout::{create_ecs_services, signal_cluster_start, wait_for_cluster_ready};
pub use teardown::{check_drained, cleanup_cluster};

/// Collaborators and settings shared by every stage of a run.
pub struct StageContext<'a, C, B, K> {
    pub cluster: &'a C,
    pub blobs: &'a B,
    pub clock: &'a K,
    pub settings: &'a Settings,
}

impl<C, B, K> StageContext<'_, C, B, K>
where
    C: ClusterManager,
    B: BlobStore,
    K: Clock,
{
    /// Run `stage` against `plan`, mutating it with whatever the stage
    /// discovers.
    ///
    /// # Errors
    ///
    /// Returns an error for fatal, non-retryable failures.
    pub async fn run(&self, stage: Stage, plan: &mut Plan) -> Result<Outcome> {
        tracing::info!(stage = %stage, cluster = %plan.cluster_name, "running stage");
        match stage {
            Stage::PopulateMissingInstances => {
                populate_missing_instances(plan, self.cluster, &self.settings.network()).await
            }
            Stage::EnsureMetricsAvailable => ensure_metrics_available(plan, self.cluster).await,
            Stage::EnsureMetricSourcesCreated => {
                ensure_metric_sources_created(plan, self.cluster, &self.settings.metrics_bucket)
                    .await
            }
            Stage::CreateEcsServices => create_ecs_services(plan, self.cluster).await,
            Stage::WaitForClusterReady => wait_for_cluster_ready(plan, self.cluster).await,
            Stage::SignalClusterStart => signal_cluster_start(plan, self.blobs, self.clock).await,
            Stage::CheckForClusterDone => {
                check_for_cluster_done(
                    plan,
                    self.cluster,
                    self.blobs,
                    self.clock,
                    self.settings.shutdown_margin(),
                )
                .await
            }
            Stage::CleanupCluster => Ok(cleanup_cluster(plan, self.cluster, self.blobs).await),
            Stage::CheckDrained => check_drained(plan, self.cluster).await,
        }
    }
}

/// The plan's run id, checked for use inside blob keys.
///
/// Stages after the first rely on `populate_missing_instances` having
/// assigned one.
pub(crate) fn require_run_id(plan: &Plan) -> Result<&str> {
    let run_id = plan
        .run_id()
        .context("plan has no run_id; run populate_missing_instances first")?;
    surge_common::validate_run_id(run_id).with_context(|| format!("invalid run_id {run_id:?}"))?;
    Ok(run_id)
}
