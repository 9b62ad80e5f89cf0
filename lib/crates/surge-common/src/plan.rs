use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Instance type used for the metrics node when a plan does not name one.
pub const DEFAULT_METRICS_INSTANCE_TYPE: &str = "c4.large";

/// Longest task family name the cluster manager registers.
pub const MAX_FAMILY_NAME_LEN: usize = 255;

/// One load-test run: target cluster, steps, metrics options and run id.
///
/// Every field is defaulted so that a structurally incomplete document still
/// deserializes and the validator can report all of its problems at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Name of the container cluster the plan runs on.
    #[serde(default)]
    pub cluster_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Absent block means metrics are disabled.
    #[serde(default)]
    pub metrics_options: MetricsOptions,
    /// Namespaces every piece of cross-worker state for this execution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    /// Private address of the metrics sidecar, written by the runner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_sidecar_address: Option<String>,
    /// Container handle of the metrics sidecar, written by the runner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_source_handle: Option<String>,
}

impl Plan {
    /// Whether the metrics sidecar and its data sources are part of this run.
    #[must_use]
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_options.enabled
    }

    /// The run id, if one has been assigned.
    #[must_use]
    pub fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// One workload definition within a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub name: String,
    /// Compute instance type the step's containers are confined to.
    #[serde(default)]
    pub instance_type: String,
    /// Number of instances (one container each) the step needs concurrently.
    #[serde(default)]
    pub instance_count: u32,
    /// Seconds after plan start before the step begins.
    #[serde(default)]
    pub start_delay: u64,
    /// Seconds the step runs for.
    #[serde(default)]
    pub duration: u64,
    #[serde(flatten)]
    pub container: ContainerSpec,
}

impl Step {
    /// Seconds from plan start until this step's window closes.
    #[must_use]
    pub fn window_end(&self) -> u64 {
        self.start_delay.saturating_add(self.duration)
    }

    /// Task family name for this step within a run: `<step>-<run_id>`.
    #[must_use]
    pub fn family_name(&self, run_id: &str) -> String {
        format!("{}-{run_id}", self.name)
    }
}

/// Container launched for every instance of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    /// Image reference, e.g. `bbangert/ap-loadtester:latest`.
    #[serde(default)]
    pub container_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cmd: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub port_mapping: Vec<u16>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_units: Option<u32>,
    /// Series name the container reports its metrics under.
    #[serde(default = "default_docker_series")]
    pub docker_series: String,
}

impl Default for ContainerSpec {
    fn default() -> Self {
        Self {
            container_name: String::new(),
            cmd: String::new(),
            port_mapping: Vec::new(),
            env: BTreeMap::new(),
            cpu_units: None,
            docker_series: default_docker_series(),
        }
    }
}

/// Metrics sidecar configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsOptions {
    /// Defaults to `true` when the block is present at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_metrics_instance_type")]
    pub instance_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<DashboardOptions>,
    /// Stop the metrics sidecar during cleanup instead of leaving it up.
    #[serde(default)]
    pub tear_down: bool,
}

impl Default for MetricsOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            instance_type: default_metrics_instance_type(),
            dashboard: None,
            tear_down: false,
        }
    }
}

/// Dashboard provisioned alongside the run's metric sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardOptions {
    #[serde(default = "default_admin_user")]
    pub admin_user: String,
    #[serde(default)]
    pub admin_password: String,
    /// Display name of the dashboard.
    #[serde(default)]
    pub name: String,
    /// Dashboard definition file in the metrics bucket.
    #[serde(default)]
    pub filename: String,
}

fn default_true() -> bool {
    true
}

fn default_docker_series() -> String {
    "default".to_string()
}

fn default_metrics_instance_type() -> String {
    DEFAULT_METRICS_INSTANCE_TYPE.to_string()
}

fn default_admin_user() -> String {
    "admin".to_string()
}
