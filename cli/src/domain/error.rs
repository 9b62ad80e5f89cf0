//! Signal taxonomy and typed domain errors.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use serde::Serialize;
use thiserror::Error;

// ── Stage signals ─────────────────────────────────────────────────────────────

/// Non-success outcome of a stage, interpreted by the driving engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Signal {
    /// The plan or its environment is invalid. Never retried.
    #[error("validation failed: {0}")]
    ValidationFailure(String),

    /// A dependent service exists but is not at its desired running count yet.
    #[error("services starting: {0}")]
    ServicesStarting(String),

    /// Metric data source creation was triggered and has not finished.
    #[error("creating metric source: {0}")]
    CreatingMetricSource(String),

    /// The run is over; the engine should move to teardown.
    #[error("shutdown plan: {0}")]
    ShutdownPlan(String),

    /// Worker services still have running tasks.
    #[error("undrained instances: {0}")]
    UndrainedInstances(String),
}

/// Discriminant of a [`Signal`], as it appears in stage reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    ValidationFailure,
    ServicesStarting,
    CreatingMetricSource,
    ShutdownPlan,
    UndrainedInstances,
}

impl Signal {
    #[must_use]
    pub fn kind(&self) -> SignalKind {
        match self {
            Self::ValidationFailure(_) => SignalKind::ValidationFailure,
            Self::ServicesStarting(_) => SignalKind::ServicesStarting,
            Self::CreatingMetricSource(_) => SignalKind::CreatingMetricSource,
            Self::ShutdownPlan(_) => SignalKind::ShutdownPlan,
            Self::UndrainedInstances(_) => SignalKind::UndrainedInstances,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::ValidationFailure(m)
            | Self::ServicesStarting(m)
            | Self::CreatingMetricSource(m)
            | Self::ShutdownPlan(m)
            | Self::UndrainedInstances(m) => m,
        }
    }

    /// Whether the same stage should be invoked again after a backoff.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ServicesStarting(_) | Self::CreatingMetricSource(_) | Self::UndrainedInstances(_)
        )
    }
}

// ── Blob storage errors ───────────────────────────────────────────────────────

/// Failures surfaced by the blob-storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("storage I/O error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

// ── Plan document errors ──────────────────────────────────────────────────────

/// Errors reading a plan document before validation can start.
#[derive(Debug, Error)]
pub enum PlanLoadError {
    #[error("unsupported plan format '{0}'. Use .json, .yaml, .yml or .toml")]
    UnsupportedFormat(String),

    #[error("plan document is not valid {format}: {message}")]
    Malformed { format: &'static str, message: String },
}

// ── Stage name errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("Unknown stage: {name}\n\nValid stages: {valid}")]
pub struct StageParseError {
    pub name: String,
    pub valid: String,
}
