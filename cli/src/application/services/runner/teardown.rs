//! Stages 8-9: release the run's resources and wait for workers to drain.

use anyhow::{Context, Result};
use surge_common::{Plan, run_prefix};

use crate::application::ports::{BlobStore, ClusterManager, ServiceManager};
use crate::domain::{Outcome, Signal};

use super::require_run_id;

/// Scale the run down and delete its signal objects. Never fails; every
/// error is logged and swallowed.
pub async fn cleanup_cluster(
    plan: &Plan,
    cluster: &impl ClusterManager,
    blobs: &impl BlobStore,
) -> Outcome {
    if let Err(err) = cluster.stop_services(plan).await {
        tracing::warn!(error = %err, "failed to stop step services");
    }

    if plan.metrics_enabled() && plan.metrics_options.tear_down {
        if let Err(err) = cluster.stop_metrics_service(plan).await {
            tracing::warn!(error = %err, "failed to stop metrics service");
        }
    }

    match require_run_id(plan) {
        Ok(run_id) => match blobs.delete_prefix(&run_prefix(run_id)).await {
            Ok(removed) => tracing::info!(removed, "run signals deleted"),
            Err(err) => tracing::warn!(error = %err, "failed to delete run signals"),
        },
        Err(err) => tracing::warn!(error = %err, "skipping signal cleanup"),
    }
    Outcome::Done
}

/// Signal `UndrainedInstances` while any step service still has tasks.
///
/// # Errors
///
/// Returns an error if the cluster manager call fails.
pub async fn check_drained(plan: &Plan, services: &impl ServiceManager) -> Result<Outcome> {
    let drained = services
        .all_services_drained(plan)
        .await
        .context("checking step services")?;
    if drained {
        tracing::info!("all step services drained");
        Ok(Outcome::Done)
    } else {
        Ok(Signal::UndrainedInstances("Waiting for step services to drain".to_string()).into())
    }
}
