//! Command implementations

pub mod stage;
pub mod stages;
pub mod validate;
pub mod version;

use std::path::PathBuf;

use clap::Args;

/// Exit code when a stage raised a signal or a plan was rejected.
pub const EXIT_SIGNAL: i32 = 3;
/// Exit code for fatal errors.
pub const EXIT_FATAL: i32 = 1;

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Success,
    /// Finished normally but reported a signal or validation errors.
    Signalled,
}

impl Completion {
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Signalled => EXIT_SIGNAL,
        }
    }
}

/// Where to read the plan document from.
#[derive(Args)]
pub struct PlanArgs {
    /// Plan document (.json, .yaml, .yml or .toml); `-` reads JSON from stdin
    #[arg(long, default_value = "-")]
    pub plan: PathBuf,
}
