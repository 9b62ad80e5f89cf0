//! Pipeline stages and the decision table the driving engine follows.
//!
//! Pure types only — no I/O, no async.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::error::{Signal, StageParseError};

/// The idempotent entry points, in invocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    PopulateMissingInstances,
    EnsureMetricsAvailable,
    EnsureMetricSourcesCreated,
    CreateEcsServices,
    WaitForClusterReady,
    SignalClusterStart,
    CheckForClusterDone,
    CleanupCluster,
    CheckDrained,
}

impl Stage {
    pub const ALL: [Stage; 9] = [
        Stage::PopulateMissingInstances,
        Stage::EnsureMetricsAvailable,
        Stage::EnsureMetricSourcesCreated,
        Stage::CreateEcsServices,
        Stage::WaitForClusterReady,
        Stage::SignalClusterStart,
        Stage::CheckForClusterDone,
        Stage::CleanupCluster,
        Stage::CheckDrained,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PopulateMissingInstances => "populate_missing_instances",
            Self::EnsureMetricsAvailable => "ensure_metrics_available",
            Self::EnsureMetricSourcesCreated => "ensure_metric_sources_created",
            Self::CreateEcsServices => "create_ecs_services",
            Self::WaitForClusterReady => "wait_for_cluster_ready",
            Self::SignalClusterStart => "signal_cluster_start",
            Self::CheckForClusterDone => "check_for_cluster_done",
            Self::CleanupCluster => "cleanup_cluster",
            Self::CheckDrained => "check_drained",
        }
    }

    /// The stage that follows this one on a normal return, if any.
    #[must_use]
    pub fn next(self) -> Option<Stage> {
        let idx = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(idx + 1).copied()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = StageParseError;

    /// Accepts `snake_case` or `kebab-case` names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == normalized)
            .ok_or_else(|| StageParseError {
                name: s.to_string(),
                valid: Self::ALL
                    .iter()
                    .map(|stage| stage.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Result of one stage invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Returned normally with no signal.
    Done,
    Signal(Signal),
}

/// What the driving engine should do after an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
    /// Invoke the next stage.
    Advance,
    /// Invoke the same stage again after a backoff.
    Retry,
    /// Stop the run without provisioning anything further.
    Abort,
    /// Jump to `cleanup_cluster`.
    Teardown,
    /// Teardown is complete.
    Finish,
}

impl Directive {
    /// The stage the engine should invoke next, if any.
    #[must_use]
    pub fn next_stage(self, current: Stage) -> Option<Stage> {
        match self {
            Self::Advance => current.next(),
            Self::Retry => Some(current),
            Self::Teardown => Some(Stage::CleanupCluster),
            Self::Abort | Self::Finish => None,
        }
    }
}

impl Outcome {
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    #[must_use]
    pub fn signal(&self) -> Option<&Signal> {
        match self {
            Self::Done => None,
            Self::Signal(signal) => Some(signal),
        }
    }

    /// Map this outcome of `stage` onto the engine's next action.
    #[must_use]
    pub fn directive(&self, stage: Stage) -> Directive {
        match self {
            // Completion polling only ever exits through ShutdownPlan.
            Self::Done if stage == Stage::CheckForClusterDone => Directive::Retry,
            Self::Done if stage.next().is_none() => Directive::Finish,
            Self::Done => Directive::Advance,
            Self::Signal(Signal::ValidationFailure(_)) => Directive::Abort,
            Self::Signal(Signal::ShutdownPlan(_)) => Directive::Teardown,
            Self::Signal(
                Signal::ServicesStarting(_)
                | Signal::CreatingMetricSource(_)
                | Signal::UndrainedInstances(_),
            ) => Directive::Retry,
        }
    }
}

impl From<Signal> for Outcome {
    fn from(signal: Signal) -> Self {
        Self::Signal(signal)
    }
}
