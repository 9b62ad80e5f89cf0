//! Stages 2-3: the metrics sidecar and the run's metric data sources.
//!
//! Both stages are no-ops when the plan has metrics disabled.

use anyhow::{Context, Result};
use surge_common::{Plan, metrics_database_name};

use crate::application::ports::{
    MetricSourceRequest, MetricSourceState, MetricsEndpoint, MetricsManager,
};
use crate::domain::{Outcome, Signal};

use super::require_run_id;

/// Make sure the metrics sidecar runs and record where it can be reached.
///
/// On success the sidecar's private address and container handle are
/// written onto the plan.
///
/// # Errors
///
/// Returns an error if the metrics service is steady but its container
/// address cannot be found, or if the cluster manager call fails.
pub async fn ensure_metrics_available(
    plan: &mut Plan,
    metrics: &impl MetricsManager,
) -> Result<Outcome> {
    if !plan.metrics_enabled() {
        return Ok(Outcome::Done);
    }

    let Some(status) = metrics
        .locate_metrics_service(plan)
        .await
        .context("locating metrics service")?
    else {
        metrics
            .create_metrics_service(plan)
            .await
            .context("creating metrics service")?;
        tracing::info!("metrics service created");
        return Ok(Signal::ServicesStarting("Triggered metrics start".to_string()).into());
    };

    tracing::info!(desired = status.desired, running = status.running, "metrics service");
    if !status.is_steady() {
        return Ok(Signal::ServicesStarting(format!(
            "Waiting for metrics: {} of {} running",
            status.running, status.desired
        ))
        .into());
    }

    let endpoint = metrics
        .locate_metrics_container(plan)
        .await
        .context("locating metrics container")?;
    let Some(MetricsEndpoint {
        address: Some(address),
        handle,
    }) = endpoint
    else {
        anyhow::bail!("Unable to locate metrics address even though its service is running");
    };

    tracing::info!(%address, %handle, "metrics sidecar located");
    plan.metrics_sidecar_address = Some(address);
    plan.metric_source_handle = Some(handle);
    Ok(Outcome::Done)
}

/// Make sure the run's database and dashboard exist on the sidecar.
///
/// # Errors
///
/// Returns an error if no sidecar address has been recorded on the plan,
/// or if the cluster manager call fails.
pub async fn ensure_metric_sources_created(
    plan: &Plan,
    metrics: &impl MetricsManager,
    bucket: &str,
) -> Result<Outcome> {
    if !plan.metrics_enabled() {
        return Ok(Outcome::Done);
    }
    let request = metric_source_request(plan, bucket)?;

    match metrics
        .metric_source_state(plan)
        .await
        .context("checking metric source state")?
    {
        MetricSourceState::Finished => Ok(Outcome::Done),
        MetricSourceState::InProgress => Ok(Signal::CreatingMetricSource(
            "Waiting for metric sources".to_string(),
        )
        .into()),
        MetricSourceState::NotStarted => {
            metrics
                .create_metric_sources(&request)
                .await
                .context("creating metric sources")?;
            tracing::info!(database = %request.database, "metric source creation triggered");
            Ok(Signal::CreatingMetricSource("Triggered metric source creation".to_string()).into())
        }
    }
}

fn metric_source_request(plan: &Plan, bucket: &str) -> Result<MetricSourceRequest> {
    let run_id = require_run_id(plan)?;
    let sidecar_address = plan
        .metrics_sidecar_address
        .clone()
        .context("no metrics sidecar address on plan; run ensure_metrics_available first")?;
    Ok(MetricSourceRequest {
        cluster_name: plan.cluster_name.clone(),
        run_id: run_id.to_string(),
        database: metrics_database_name(run_id),
        sidecar_address,
        handle: plan.metric_source_handle.clone().unwrap_or_default(),
        bucket: bucket.to_string(),
        dashboard: plan.metrics_options.dashboard.clone(),
    })
}
