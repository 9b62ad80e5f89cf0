//! Runner settings.
//!
//! Pure types only — loading lives in `infra::config`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_BLOB_ROOT: &str = "./surge-blobs";
pub const DEFAULT_METRICS_BUCKET: &str = "surge-metrics";
pub const DEFAULT_CLUSTER_HELPER: &str = "surge-cluster";
pub const DEFAULT_HELPER_TIMEOUT_SECS: u64 = 120;
/// Added to the plan's total duration before the run is declared over.
pub const DEFAULT_SHUTDOWN_MARGIN_SECS: u64 = 30;

// ── Settings schema ──────────────────────────────────────────────────────────

/// Environment the runner operates in: where blobs live, which helper
/// manages the cluster, and which network parameters new instances get.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root directory of the blob store holding start and heartbeat objects.
    pub blob_root: PathBuf,
    /// Bucket handed to metric-source creation for dashboard files.
    pub metrics_bucket: String,
    /// Program implementing the cluster helper protocol.
    pub cluster_helper: String,
    pub helper_timeout_secs: u64,
    pub worker_security_group: Option<String>,
    pub metrics_security_group: Option<String>,
    pub instance_profile: Option<String>,
    pub shutdown_margin_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            blob_root: PathBuf::from(DEFAULT_BLOB_ROOT),
            metrics_bucket: DEFAULT_METRICS_BUCKET.to_string(),
            cluster_helper: DEFAULT_CLUSTER_HELPER.to_string(),
            helper_timeout_secs: DEFAULT_HELPER_TIMEOUT_SECS,
            worker_security_group: None,
            metrics_security_group: None,
            instance_profile: None,
            shutdown_margin_secs: DEFAULT_SHUTDOWN_MARGIN_SECS,
        }
    }
}

impl Settings {
    #[must_use]
    pub fn shutdown_margin(&self) -> Duration {
        Duration::from_secs(self.shutdown_margin_secs)
    }

    #[must_use]
    pub fn helper_timeout(&self) -> Duration {
        Duration::from_secs(self.helper_timeout_secs)
    }

    /// Network parameters passed along with every instance request.
    #[must_use]
    pub fn network(&self) -> NetworkConfig {
        NetworkConfig {
            worker_security_group: self.worker_security_group.clone(),
            metrics_security_group: self.metrics_security_group.clone(),
            instance_profile: self.instance_profile.clone(),
        }
    }
}

/// Security groups and instance profile for requested instances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_security_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_security_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_profile: Option<String>,
}

// ── Unit tests ───────────────────────────────────────────────────────────────
