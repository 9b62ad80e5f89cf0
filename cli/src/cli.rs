//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{self, Completion};
use crate::infra::config::load_settings;

/// Plan runner for distributed load tests on container clusters
#[derive(Parser)]
#[command(
    name = "surge",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Settings file (YAML); SURGE_* environment variables are used otherwise
    #[arg(long, global = true, env = "SURGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON output (version, stages; stage and validate always use JSON)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one pipeline stage against a plan
    Stage(commands::stage::StageArgs),

    /// Validate a plan and its target cluster
    Validate(commands::PlanArgs),

    /// List pipeline stages in invocation order
    Stages,

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if settings cannot be loaded or the command fails.
    pub async fn run(self) -> Result<Completion> {
        let Cli {
            config,
            json,
            command,
        } = self;
        match command {
            Command::Version => {
                commands::version::run(json);
                Ok(Completion::Success)
            }
            Command::Stages => {
                commands::stages::run(json)?;
                Ok(Completion::Success)
            }
            Command::Stage(args) => {
                let settings = load_settings(config.as_deref())?;
                commands::stage::run(&args, &settings).await
            }
            Command::Validate(args) => {
                let settings = load_settings(config.as_deref())?;
                commands::validate::run(&args, &settings).await
            }
        }
    }
}
