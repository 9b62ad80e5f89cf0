//! `ClusterManager` backed by an external helper program.
//!
//! Each operation runs `<helper> <operation>` with a JSON request on stdin
//! and reads a JSON response from stdout. A non-zero exit is an error that
//! carries the helper's stderr.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use surge_common::{Plan, Step};

use crate::application::ports::{
    CapacityManager, CommandRunner, InstanceRequest, MetricSourceRequest, MetricSourceState,
    MetricsEndpoint, MetricsManager, ServiceManager, ServiceStatus,
};
use crate::domain::InstanceDemand;

#[derive(Serialize)]
struct ClusterQuery<'a> {
    cluster: &'a str,
}

#[derive(Serialize)]
struct InstanceQuery<'a> {
    cluster: &'a str,
    #[serde(flatten)]
    request: &'a InstanceRequest,
}

#[derive(Serialize)]
struct PlanQuery<'a> {
    plan: &'a Plan,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<&'a Step>,
}

impl<'a> PlanQuery<'a> {
    fn new(plan: &'a Plan) -> Self {
        Self { plan, step: None }
    }
}

pub struct CommandClusterManager<R> {
    runner: R,
    helper: String,
}

impl<R: CommandRunner> CommandClusterManager<R> {
    pub fn new(runner: R, helper: impl Into<String>) -> Self {
        Self {
            runner,
            helper: helper.into(),
        }
    }

    /// Run `operation` and return the helper's raw stdout.
    async fn invoke<Q: Serialize>(&self, operation: &str, request: &Q) -> Result<Vec<u8>> {
        let body = serde_json::to_vec(request)
            .with_context(|| format!("serializing {operation} request"))?;
        let output = self
            .runner
            .run_with_stdin(&self.helper, &[operation], &body)
            .await
            .with_context(|| format!("running {} {operation}", self.helper))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{} {operation} failed: {}", self.helper, stderr.trim());
        }
        Ok(output.stdout)
    }

    async fn query<Q: Serialize, T: DeserializeOwned>(
        &self,
        operation: &str,
        request: &Q,
    ) -> Result<T> {
        let stdout = self.invoke(operation, request).await?;
        serde_json::from_slice(&stdout).with_context(|| {
            format!(
                "parsing {operation} response: {}",
                String::from_utf8_lossy(&stdout).trim()
            )
        })
    }

    async fn command<Q: Serialize>(&self, operation: &str, request: &Q) -> Result<()> {
        self.invoke(operation, request).await.map(drop)
    }
}

impl<R: CommandRunner> CapacityManager for CommandClusterManager<R> {
    async fn cluster_exists(&self, cluster: &str) -> Result<bool> {
        self.query("cluster-exists", &ClusterQuery { cluster }).await
    }

    async fn query_active_instances(&self, cluster: &str) -> Result<InstanceDemand> {
        self.query("query-active-instances", &ClusterQuery { cluster })
            .await
    }

    async fn request_instances(&self, cluster: &str, request: &InstanceRequest) -> Result<()> {
        self.command("request-instances", &InstanceQuery { cluster, request })
            .await
    }

    async fn has_metrics_node(&self, cluster: &str) -> Result<bool> {
        self.query("has-metrics-node", &ClusterQuery { cluster }).await
    }
}

impl<R: CommandRunner> ServiceManager for CommandClusterManager<R> {
    async fn create_services(&self, plan: &Plan) -> Result<()> {
        self.command("create-services", &PlanQuery::new(plan)).await
    }

    async fn all_services_ready(&self, plan: &Plan) -> Result<bool> {
        self.query("all-services-ready", &PlanQuery::new(plan)).await
    }

    async fn stop_service(&self, plan: &Plan, step: &Step) -> Result<()> {
        let request = PlanQuery {
            plan,
            step: Some(step),
        };
        self.command("stop-service", &request).await
    }

    async fn stop_services(&self, plan: &Plan) -> Result<()> {
        self.command("stop-services", &PlanQuery::new(plan)).await
    }

    async fn all_services_drained(&self, plan: &Plan) -> Result<bool> {
        self.query("all-services-drained", &PlanQuery::new(plan)).await
    }
}

impl<R: CommandRunner> MetricsManager for CommandClusterManager<R> {
    async fn locate_metrics_service(&self, plan: &Plan) -> Result<Option<ServiceStatus>> {
        self.query("locate-metrics-service", &PlanQuery::new(plan))
            .await
    }

    async fn create_metrics_service(&self, plan: &Plan) -> Result<()> {
        self.command("create-metrics-service", &PlanQuery::new(plan))
            .await
    }

    async fn stop_metrics_service(&self, plan: &Plan) -> Result<()> {
        self.command("stop-metrics-service", &PlanQuery::new(plan))
            .await
    }

    async fn locate_metrics_container(&self, plan: &Plan) -> Result<Option<MetricsEndpoint>> {
        self.query("locate-metrics-container", &PlanQuery::new(plan))
            .await
    }

    async fn metric_source_state(&self, plan: &Plan) -> Result<MetricSourceState> {
        self.query("metric-source-state", &PlanQuery::new(plan))
            .await
    }

    async fn create_metric_sources(&self, request: &MetricSourceRequest) -> Result<()> {
        self.command("create-metric-sources", request).await
    }
}
