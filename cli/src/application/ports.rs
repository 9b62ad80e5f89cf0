//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and `surge_common` — never
//! from `crate::infra`, `crate::commands`, or `crate::output`.

use std::process::Output;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surge_common::{DashboardOptions, Plan, Step};

use crate::domain::{InstanceDemand, NetworkConfig, StorageError};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Instances to add to a cluster in one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRequest {
    /// Shortfall per instance type, metrics node included.
    pub instances: InstanceDemand,
    /// When set, one instance of this type is the dedicated metrics node and
    /// gets the metrics security group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_node_type: Option<String>,
    pub network: NetworkConfig,
}

/// Desired vs running task count of a managed service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub desired: u32,
    pub running: u32,
}

impl ServiceStatus {
    #[must_use]
    pub fn is_steady(self) -> bool {
        self.desired == self.running
    }
}

/// Where the running metrics sidecar can be reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsEndpoint {
    /// Private network address; absent when the task has no attachment yet.
    #[serde(default)]
    pub address: Option<String>,
    /// Container handle (task identifier) of the sidecar.
    pub handle: String,
}

/// Progress of metric data source creation for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSourceState {
    NotStarted,
    InProgress,
    Finished,
}

/// Everything needed to create a run's database and dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSourceRequest {
    pub cluster_name: String,
    pub run_id: String,
    pub database: String,
    pub sidecar_address: String,
    pub handle: String,
    pub bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<DashboardOptions>,
}

/// One object in the blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobObject {
    pub key: String,
    pub last_modified: DateTime<Utc>,
}

// ── Cluster Manager Port Traits ───────────────────────────────────────────────

/// Compute capacity of a cluster.
#[allow(async_fn_in_trait)]
pub trait CapacityManager {
    /// Whether the named cluster exists in the target infrastructure.
    async fn cluster_exists(&self, cluster: &str) -> Result<bool>;
    /// Active and pending worker instances per type. Excludes the dedicated
    /// metrics node.
    async fn query_active_instances(&self, cluster: &str) -> Result<InstanceDemand>;
    /// Launch additional instances into the cluster.
    async fn request_instances(&self, cluster: &str, request: &InstanceRequest) -> Result<()>;
    /// Whether a dedicated metrics node is active or pending.
    async fn has_metrics_node(&self, cluster: &str) -> Result<bool>;
}

/// One managed service per plan step, named by the step's family name.
#[allow(async_fn_in_trait)]
pub trait ServiceManager {
    /// Create or update a service for every step of the plan.
    async fn create_services(&self, plan: &Plan) -> Result<()>;
    /// Whether every step service runs its desired count.
    async fn all_services_ready(&self, plan: &Plan) -> Result<bool>;
    /// Scale one step service to zero.
    async fn stop_service(&self, plan: &Plan, step: &Step) -> Result<()>;
    /// Scale every step service to zero.
    async fn stop_services(&self, plan: &Plan) -> Result<()>;
    /// Whether no step service has running tasks left.
    async fn all_services_drained(&self, plan: &Plan) -> Result<bool>;
}

/// The metrics sidecar and the per-run data sources behind it.
#[allow(async_fn_in_trait)]
pub trait MetricsManager {
    /// Status of the metrics service, or `None` if it does not exist.
    async fn locate_metrics_service(&self, plan: &Plan) -> Result<Option<ServiceStatus>>;
    async fn create_metrics_service(&self, plan: &Plan) -> Result<()>;
    async fn stop_metrics_service(&self, plan: &Plan) -> Result<()>;
    /// Address and handle of the running sidecar container, if one is found.
    async fn locate_metrics_container(&self, plan: &Plan) -> Result<Option<MetricsEndpoint>>;
    async fn metric_source_state(&self, plan: &Plan) -> Result<MetricSourceState>;
    async fn create_metric_sources(&self, request: &MetricSourceRequest) -> Result<()>;
}

/// Composite trait — any type implementing all three sub-traits is a `ClusterManager`.
pub trait ClusterManager: CapacityManager + ServiceManager + MetricsManager {}

/// Blanket implementation: any type implementing all three sub-traits is a `ClusterManager`.
impl<T> ClusterManager for T where T: CapacityManager + ServiceManager + MetricsManager {}

// ── Blob Storage Port ─────────────────────────────────────────────────────────

/// Start-signal and heartbeat storage, addressed by key.
///
/// Errors are typed so callers can tell "not found / access denied" apart.
#[allow(async_fn_in_trait)]
pub trait BlobStore {
    /// Write `body` under `key`, replacing any existing object.
    async fn put_object(&self, key: &str, body: &[u8]) -> Result<(), StorageError>;
    /// All objects whose key starts with `prefix`, with their write time.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<BlobObject>, StorageError>;
    /// Delete every object under `prefix`; returns how many were removed.
    async fn delete_prefix(&self, prefix: &str) -> Result<usize, StorageError>;
}

// ── Clock Port ────────────────────────────────────────────────────────────────

/// Abstracts wall-clock time so completion checks can be tested.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program with stdin piped from `input` and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds the
    /// runner's timeout. On timeout, the child process must be killed.
    async fn run_with_stdin(&self, program: &str, args: &[&str], input: &[u8]) -> Result<Output>;
}
