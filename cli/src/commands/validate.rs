//! Validate command — checks a plan without provisioning anything.

use anyhow::{Context, Result};

use crate::application::services::plan_validation::validate_plan;
use crate::commands::{Completion, PlanArgs};
use crate::domain::Settings;
use crate::infra::cluster::CommandClusterManager;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::plan_loader::load_plan;

/// Run the validate command and print the `{plan, errors}` result.
///
/// # Errors
///
/// Returns an error if the plan cannot be loaded or the cluster helper
/// cannot be queried.
pub async fn run(args: &PlanArgs, settings: &Settings) -> Result<Completion> {
    let plan = load_plan(Some(&args.plan))?;
    let cluster = CommandClusterManager::new(
        TokioCommandRunner::new(settings.helper_timeout()),
        settings.cluster_helper.clone(),
    );
    let result = validate_plan(plan, &cluster).await?;
    let out = serde_json::to_string_pretty(&result).context("JSON serialization failed")?;
    println!("{out}");
    Ok(if result.is_valid() {
        Completion::Success
    } else {
        Completion::Signalled
    })
}
