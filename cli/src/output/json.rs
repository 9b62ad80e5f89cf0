//! JSON output helpers.
//!
//! Provides the stage report printed after every `surge stage` invocation
//! and the error-object formatter used when a command fails.

use anyhow::{Context, Result};
use serde::Serialize;
use surge_common::Plan;

use crate::domain::{Directive, Outcome, SignalKind, Stage};

/// Signal carried by a stage report.
#[derive(Debug, Serialize)]
pub struct SignalReport<'a> {
    pub kind: SignalKind,
    pub message: &'a str,
}

/// What one stage invocation did and what the engine should do next.
///
/// ```json
/// {
///   "stage": "wait_for_cluster_ready",
///   "outcome": "signal",
///   "signal": { "kind": "services_starting", "message": "..." },
///   "directive": "retry",
///   "next_stage": "wait_for_cluster_ready",
///   "plan": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct StageReport<'a> {
    pub stage: Stage,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<SignalReport<'a>>,
    pub directive: Directive,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_stage: Option<Stage>,
    pub plan: &'a Plan,
}

impl<'a> StageReport<'a> {
    #[must_use]
    pub fn new(stage: Stage, outcome: &'a Outcome, plan: &'a Plan) -> Self {
        let directive = outcome.directive(stage);
        Self {
            stage,
            outcome: if outcome.is_done() { "done" } else { "signal" },
            signal: outcome.signal().map(|signal| SignalReport {
                kind: signal.kind(),
                message: signal.message(),
            }),
            directive,
            next_stage: directive.next_stage(stage),
            plan,
        }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("JSON serialization failed")
    }
}

/// Format a JSON error object.
///
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}
