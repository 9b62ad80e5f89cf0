//! Blob key layout shared by the runner and the worker containers.
//!
//! Everything a run writes lives under `{run_id}/`:
//! - `{run_id}/start.ready` — start barrier, written by the runner
//! - `{run_id}/heartbeat/{worker_id}` — liveness markers, written by workers

use thiserror::Error;

/// Longest run id accepted when building keys.
pub const MAX_RUN_ID_LEN: usize = 64;

/// File name of the start barrier inside a run prefix.
pub const START_SIGNAL: &str = "start.ready";

/// Directory of worker heartbeats inside a run prefix.
pub const HEARTBEAT_DIR: &str = "heartbeat";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("plan has no run_id yet")]
    MissingRunId,

    #[error("run_id must be at most {MAX_RUN_ID_LEN} characters")]
    RunIdTooLong,

    #[error("run_id may only contain letters, digits, '-' and '_'")]
    RunIdInvalidCharacters,
}

/// Validate a run id before it is interpolated into a blob key.
///
/// Rejects separators and dots so a key can never escape its run prefix.
pub fn validate_run_id(run_id: &str) -> Result<(), KeyError> {
    if run_id.is_empty() {
        return Err(KeyError::MissingRunId);
    }
    if run_id.len() > MAX_RUN_ID_LEN {
        return Err(KeyError::RunIdTooLong);
    }
    if !run_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(KeyError::RunIdInvalidCharacters);
    }
    Ok(())
}

pub fn run_prefix(run_id: &str) -> String {
    format!("{run_id}/")
}

pub fn start_signal_key(run_id: &str) -> String {
    format!("{run_id}/{START_SIGNAL}")
}

pub fn heartbeat_key(run_id: &str, worker_id: &str) -> String {
    format!("{run_id}/{HEARTBEAT_DIR}/{worker_id}")
}

/// Name of the time-series database holding a run's metrics.
pub fn metrics_database_name(run_id: &str) -> String {
    format!("run_{}", run_id.replace('-', "_"))
}
