//! Stages 4-6: create the step services, wait for them, release the workers.

use anyhow::{Context, Result};
use serde::Serialize;
use surge_common::{Plan, start_signal_key};

use crate::application::ports::{BlobStore, Clock, ServiceManager};
use crate::domain::{Outcome, Signal};

use super::require_run_id;

/// Body of the start-signal object.
#[derive(Debug, Serialize)]
struct StartSignal<'a> {
    cluster_name: &'a str,
    started_at: String,
}

/// Create or update one managed service per step.
///
/// # Errors
///
/// Returns an error if the plan has no run id or the cluster manager call
/// fails.
pub async fn create_ecs_services(plan: &Plan, services: &impl ServiceManager) -> Result<Outcome> {
    require_run_id(plan)?;
    services
        .create_services(plan)
        .await
        .context("creating step services")?;
    tracing::info!(steps = plan.steps.len(), "step services created");
    Ok(Outcome::Done)
}

/// Signal `ServicesStarting` until every step service runs its desired count.
///
/// # Errors
///
/// Returns an error if the cluster manager call fails.
pub async fn wait_for_cluster_ready(
    plan: &Plan,
    services: &impl ServiceManager,
) -> Result<Outcome> {
    let ready = services
        .all_services_ready(plan)
        .await
        .context("checking step services")?;
    if ready {
        tracing::info!("all step services running");
        Ok(Outcome::Done)
    } else {
        Ok(Signal::ServicesStarting("Waiting for step services".to_string()).into())
    }
}

/// Write the start barrier workers wait on. Safe to repeat; the object is
/// overwritten.
///
/// # Errors
///
/// Returns an error if the plan has no run id or the object cannot be
/// written.
pub async fn signal_cluster_start(
    plan: &Plan,
    blobs: &impl BlobStore,
    clock: &impl Clock,
) -> Result<Outcome> {
    let run_id = require_run_id(plan)?;
    let key = start_signal_key(run_id);
    let body = serde_json::to_vec(&StartSignal {
        cluster_name: &plan.cluster_name,
        started_at: clock.now().to_rfc3339(),
    })
    .context("serializing start signal")?;
    blobs
        .put_object(&key, &body)
        .await
        .with_context(|| format!("writing start signal {key}"))?;
    tracing::info!(%key, "start signal written");
    Ok(Outcome::Done)
}
