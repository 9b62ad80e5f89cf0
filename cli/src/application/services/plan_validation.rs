//! Plan validation use-case: structural checks plus environment consistency.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Context, Result};
use serde::Serialize;
use surge_common::Plan;
use uuid::Uuid;

use crate::application::ports::CapacityManager;
use crate::domain::validate::{CLUSTER_NOT_FOUND, ErrorReport, check_name, check_plan_structure};

/// A plan paired with every problem found in it.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub plan: Plan,
    pub errors: ErrorReport,
}

impl ValidationResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate `plan` against its structure and the target infrastructure.
///
/// The cluster lookup only runs for a structurally valid cluster name, so a
/// malformed name is reported once. An accepted plan is normalized before it
/// is returned: a run id is generated when none was supplied.
///
/// # Errors
///
/// Returns an error only if the cluster manager cannot be queried; invalid
/// plans are reported through [`ValidationResult::errors`].
pub async fn validate_plan(plan: Plan, cluster: &impl CapacityManager) -> Result<ValidationResult> {
    let mut errors = check_plan_structure(&plan);

    if check_name(&plan.cluster_name).is_none() {
        let exists = cluster
            .cluster_exists(&plan.cluster_name)
            .await
            .with_context(|| format!("looking up cluster {}", plan.cluster_name))?;
        if !exists {
            errors.add("cluster_name", CLUSTER_NOT_FOUND);
        }
    }

    let plan = if errors.is_empty() {
        normalize(plan)
    } else {
        plan
    };

    if !errors.is_empty() {
        tracing::debug!(problems = errors.message_count(), "plan rejected");
    }
    Ok(ValidationResult { plan, errors })
}

/// Apply defaults that depend on the run rather than the document.
#[must_use]
pub fn normalize(mut plan: Plan) -> Plan {
    if plan.run_id().is_none() {
        plan.run_id = Some(Uuid::new_v4().to_string());
    }
    plan
}
