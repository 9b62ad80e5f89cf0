//! Pure plan validation — no I/O, no async.
//!
//! Checks accumulate into an [`ErrorReport`]; nothing short-circuits, so a
//! single pass reports every structural problem in the document.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use surge_common::keys::MAX_RUN_ID_LEN;
use surge_common::{MAX_FAMILY_NAME_LEN, Plan};

/// Longest cluster or step name accepted, in characters. Leaves room for
/// `-<run_id>` so task family names stay within [`MAX_FAMILY_NAME_LEN`].
pub const MAX_NAME_LEN: usize = MAX_FAMILY_NAME_LEN - 1 - MAX_RUN_ID_LEN;

/// Letters, digits and hyphens only.
pub static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Safety: this is a compile-time constant pattern — cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9-]+$").expect("valid regex")
});

/// Recorded under `cluster_name` when the cluster manager does not know it.
pub const CLUSTER_NOT_FOUND: &str = "No cluster with the provided name";

/// Why a name was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameProblem {
    Missing,
    TooLong,
    InvalidCharacters,
}

/// Check a cluster or step name. Reports at most one problem per name.
#[must_use]
pub fn check_name(value: &str) -> Option<NameProblem> {
    if value.is_empty() {
        Some(NameProblem::Missing)
    } else if value.chars().count() > MAX_NAME_LEN {
        Some(NameProblem::TooLong)
    } else if !NAME_RE.is_match(value) {
        Some(NameProblem::InvalidCharacters)
    } else {
        None
    }
}

fn cluster_name_message(problem: NameProblem) -> &'static str {
    match problem {
        NameProblem::Missing => "Plan cluster_name missing",
        NameProblem::TooLong => "Plan cluster_name too long",
        NameProblem::InvalidCharacters => "Plan cluster_name contains invalid characters",
    }
}

fn step_name_message(problem: NameProblem) -> &'static str {
    match problem {
        NameProblem::Missing => "Step name missing",
        NameProblem::TooLong => "Step name too long",
        NameProblem::InvalidCharacters => "Step name contains invalid characters",
    }
}

/// Field name → messages, plus step index → field name → messages.
///
/// Serializes as `{"cluster_name": [..], "steps": {"0": {"name": [..]}}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    #[serde(flatten)]
    pub fields: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub steps: BTreeMap<usize, BTreeMap<String, Vec<String>>>,
}

impl ErrorReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.steps.is_empty()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_step(&mut self, index: usize, field: &str, message: impl Into<String>) {
        self.steps
            .entry(index)
            .or_default()
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Messages recorded against a top-level field.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Messages recorded against a field of the step at `index`.
    #[must_use]
    pub fn step_field(&self, index: usize, field: &str) -> Option<&[String]> {
        self.steps
            .get(&index)
            .and_then(|fields| fields.get(field))
            .map(Vec::as_slice)
    }

    /// Total number of messages, top-level and step-scoped.
    #[must_use]
    pub fn message_count(&self) -> usize {
        let top: usize = self.fields.values().map(Vec::len).sum();
        let steps: usize = self
            .steps
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum();
        top + steps
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        for (field, messages) in &self.fields {
            for message in messages {
                parts.push(format!("{field}: {message}"));
            }
        }
        for (index, fields) in &self.steps {
            for (field, messages) in fields {
                for message in messages {
                    parts.push(format!("steps[{index}].{field}: {message}"));
                }
            }
        }
        f.write_str(&parts.join("; "))
    }
}

/// Run every structural check against `plan`.
///
/// Environment consistency (does the cluster exist) is the caller's job;
/// see `application::services::plan_validation`.
#[must_use]
pub fn check_plan_structure(plan: &Plan) -> ErrorReport {
    let mut report = ErrorReport::default();

    if let Some(problem) = check_name(&plan.cluster_name) {
        report.add("cluster_name", cluster_name_message(problem));
    }

    if let Some(run_id) = plan.run_id() {
        if let Err(err) = surge_common::validate_run_id(run_id) {
            report.add("run_id", err.to_string());
        }
    }

    if plan.steps.is_empty() {
        report.add("plan", "Plan requires at least one step");
    }

    for (index, step) in plan.steps.iter().enumerate() {
        if let Some(problem) = check_name(&step.name) {
            report.add_step(index, "name", step_name_message(problem));
        }
        if step.instance_type.trim().is_empty() {
            report.add_step(index, "instance_type", "Step instance_type missing");
        }
        if step.instance_count == 0 {
            report.add_step(index, "instance_count", "Step instance_count must be at least 1");
        }
        if step.duration == 0 {
            report.add_step(index, "duration", "Step duration must be at least 1 second");
        }
        if step.container.container_name.trim().is_empty() {
            report.add_step(index, "container_name", "Step container_name missing");
        }
    }

    if let Some(dashboard) = &plan.metrics_options.dashboard {
        let required = [
            ("admin_password", &dashboard.admin_password),
            ("name", &dashboard.name),
            ("filename", &dashboard.filename),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                report.add(
                    &format!("metrics_options.dashboard.{field}"),
                    format!("Dashboard {field} missing"),
                );
            }
        }
    }

    report
}
