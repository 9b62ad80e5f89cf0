//! Stage 1: validate the plan and top up cluster capacity.

use anyhow::{Context, Result};
use surge_common::Plan;

use crate::application::ports::{CapacityManager, InstanceRequest};
use crate::application::services::plan_validation::validate_plan;
use crate::domain::{NetworkConfig, Outcome, Signal, instance_demand, missing_instances};

/// Re-validate `plan` and request any instances the cluster is short of.
///
/// The plan is normalized in place, so a run id is assigned here on the
/// first call. Capacity is re-queried on every call; a repeat call after
/// the requested instances show up requests nothing. Does not wait for the
/// new instances to become ready.
///
/// # Errors
///
/// Returns an error if the cluster manager cannot be queried or refuses the
/// instance request.
pub async fn populate_missing_instances(
    plan: &mut Plan,
    cluster: &impl CapacityManager,
    network: &NetworkConfig,
) -> Result<Outcome> {
    let validated = validate_plan(plan.clone(), cluster).await?;
    *plan = validated.plan;
    if !validated.errors.is_empty() {
        tracing::warn!(errors = %validated.errors, "plan failed validation");
        return Ok(Signal::ValidationFailure(format!(
            "Failed to validate: {}",
            validated.errors
        ))
        .into());
    }

    let mut needed = instance_demand(plan);
    let current = cluster
        .query_active_instances(&plan.cluster_name)
        .await
        .context("querying active instances")?;
    let mut missing = missing_instances(&needed, &current);

    // Active instance counts never include the metrics node, so its
    // shortfall is tracked separately from the workers of the same type.
    let metrics_node_type = if plan.metrics_enabled()
        && !cluster
            .has_metrics_node(&plan.cluster_name)
            .await
            .context("looking for a metrics node")?
    {
        let instance_type = plan.metrics_options.instance_type.clone();
        *needed.entry(instance_type.clone()).or_insert(0) += 1;
        *missing.entry(instance_type.clone()).or_insert(0) += 1;
        Some(instance_type)
    } else {
        None
    };

    tracing::info!(?needed, ?current, "plan instances needed");
    if missing.is_empty() {
        return Ok(Outcome::Done);
    }

    tracing::info!(?missing, "requesting instances");
    let request = InstanceRequest {
        instances: missing,
        metrics_node_type,
        network: network.clone(),
    };
    cluster
        .request_instances(&plan.cluster_name, &request)
        .await
        .context("requesting instances")?;
    Ok(Outcome::Done)
}
