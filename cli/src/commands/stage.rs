//! Stage command — runs one pipeline stage against a plan.

use anyhow::Result;
use clap::Args;

use crate::application::services::runner::StageContext;
use crate::commands::{Completion, PlanArgs};
use crate::domain::{Settings, Stage};
use crate::infra::blob_store::FsBlobStore;
use crate::infra::clock::SystemClock;
use crate::infra::cluster::CommandClusterManager;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::plan_loader::load_plan;
use crate::output::json::{StageReport, format_error};

/// Arguments for the stage command.
#[derive(Args)]
pub struct StageArgs {
    /// Stage to run, e.g. `populate_missing_instances`
    pub stage: Stage,

    #[command(flatten)]
    pub source: PlanArgs,
}

/// Run one stage and print its report.
///
/// Fatal failures print a JSON error object to stdout before the error is
/// returned.
///
/// # Errors
///
/// Returns an error if the plan cannot be loaded or the stage fails fatally.
pub async fn run(args: &StageArgs, settings: &Settings) -> Result<Completion> {
    let mut plan = load_plan(Some(&args.source.plan))?;

    let cluster = CommandClusterManager::new(
        TokioCommandRunner::new(settings.helper_timeout()),
        settings.cluster_helper.clone(),
    );
    let blobs = FsBlobStore::new(&settings.blob_root);
    let ctx = StageContext {
        cluster: &cluster,
        blobs: &blobs,
        clock: &SystemClock,
        settings,
    };

    let outcome = match ctx.run(args.stage, &mut plan).await {
        Ok(outcome) => outcome,
        Err(err) => {
            println!("{}", format_error(&format!("{err:#}"), "stage_failed")?);
            return Err(err);
        }
    };

    if let Some(signal) = outcome.signal() {
        tracing::info!(stage = %args.stage, kind = ?signal.kind(), "{}", signal.message());
    }
    println!("{}", StageReport::new(args.stage, &outcome, &plan).to_json()?);
    Ok(if outcome.is_done() {
        Completion::Success
    } else {
        Completion::Signalled
    })
}
