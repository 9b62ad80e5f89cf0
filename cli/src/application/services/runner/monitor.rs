//! Stage 7: decide whether the run is over.

use std::time::Duration;

use anyhow::Result;
use surge_common::{Plan, run_prefix};

use crate::application::ports::{BlobStore, Clock, ServiceManager};
use crate::domain::{Outcome, Signal, finished_steps, total_duration};

use super::require_run_id;

/// Compare time since the earliest run signal against the plan's duration.
///
/// Signals `ShutdownPlan` once elapsed time exceeds the total duration plus
/// `margin`, and also when the run's signal objects cannot be read at all.
/// Steps whose own window has closed are scaled down on the way, best-effort.
///
/// # Errors
///
/// Returns an error only if the plan has no usable run id.
pub async fn check_for_cluster_done(
    plan: &Plan,
    services: &impl ServiceManager,
    blobs: &impl BlobStore,
    clock: &impl Clock,
    margin: Duration,
) -> Result<Outcome> {
    let run_id = require_run_id(plan)?;
    let objects = match blobs.list_objects(&run_prefix(run_id)).await {
        Ok(objects) => objects,
        Err(err) => {
            tracing::warn!(error = %err, "cannot read run signals, shutting down");
            return Ok(Signal::ShutdownPlan(format!("Error accessing run signals: {err}")).into());
        }
    };
    let Some(started) = objects.iter().map(|object| object.last_modified).min() else {
        tracing::warn!(%run_id, "no run signals found, shutting down");
        return Ok(Signal::ShutdownPlan("No start signal found for run".to_string()).into());
    };

    let elapsed = u64::try_from((clock.now() - started).num_seconds()).unwrap_or(0);
    let budget = total_duration(plan).saturating_add(margin.as_secs());

    for step in finished_steps(plan, elapsed) {
        if let Err(err) = services.stop_service(plan, step).await {
            tracing::warn!(step = %step.name, error = %err, "failed to stop finished step");
        }
    }

    if elapsed > budget {
        tracing::info!(elapsed, budget, "test plan has completed");
        return Ok(Signal::ShutdownPlan("Test plan has completed".to_string()).into());
    }
    tracing::info!(elapsed, budget, "test plan running");
    Ok(Outcome::Done)
}
