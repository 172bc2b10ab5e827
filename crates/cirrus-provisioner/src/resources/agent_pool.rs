use std::collections::{BTreeMap, BTreeSet};

use cirrus_core::models::{AgentPool, AgentPoolMode, AgentPoolProperties};
use serde::Serialize;

use crate::diff::{diff, ensure_terminal, merge_system_labels};
use crate::error::ProvisionerError;
use crate::spec::{ParameterContext, ResourceSpec};

const SCALE_SET_POOL_TYPE: &str = "VirtualMachineScaleSets";

/// Desired state of an agent pool in a managed cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentPoolSpec {
    pub name: String,
    pub resource_group: String,
    /// Name of the managed cluster owning the pool.
    pub cluster: String,
    /// Desired Kubernetes version.
    pub version: Option<String>,
    /// VM size of the pool's machines.
    pub sku: String,
    pub replicas: i32,
    pub os_disk_size_gb: i32,
    pub vnet_subnet_id: String,
    pub mode: AgentPoolMode,
    pub max_count: Option<i32>,
    pub min_count: Option<i32>,
    pub node_labels: Option<BTreeMap<String, String>>,
    pub node_taints: Vec<String>,
    pub enable_auto_scaling: Option<bool>,
    pub availability_zones: Vec<String>,
    pub max_pods: Option<i32>,
    /// `Ephemeral` or `Managed`.
    pub os_disk_type: Option<String>,
    pub enable_ultra_ssd: Option<bool>,
    /// `Linux` or `Windows`.
    pub os_type: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub enable_node_public_ip: Option<bool>,
    pub node_public_ip_prefix_id: Option<String>,
    /// `Spot` or `Regular`.
    pub scale_set_priority: Option<String>,
}

/// Fields of an agent pool we compare to decide whether to update.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct AgentPoolProjection {
    count: Option<i32>,
    orchestrator_version: Option<String>,
    mode: Option<AgentPoolMode>,
    enable_auto_scaling: Option<bool>,
    min_count: Option<i32>,
    max_count: Option<i32>,
    node_labels: Option<BTreeMap<String, String>>,
    node_taints: Option<BTreeSet<String>>,
}

impl AgentPoolProjection {
    fn from_existing(existing: &AgentPoolProperties) -> Self {
        Self {
            count: existing.count,
            orchestrator_version: existing.orchestrator_version.clone(),
            mode: existing.mode,
            enable_auto_scaling: existing.enable_auto_scaling,
            min_count: existing.min_count,
            max_count: existing.max_count,
            node_labels: existing.node_labels.clone(),
            node_taints: taint_set(existing),
        }
    }
}

fn taint_set(properties: &AgentPoolProperties) -> Option<BTreeSet<String>> {
    properties
        .node_taints
        .as_ref()
        .map(|taints| taints.iter().cloned().collect())
}

impl AgentPoolSpec {
    fn autoscaling_enabled(&self) -> bool {
        self.enable_auto_scaling.unwrap_or(false)
    }

    /// The desired projection, normalized against what exists.
    ///
    /// Taints are taken from `existing`, so they never cause drift on their own.
    /// With autoscaling on, the autoscaler owns the node count.
    fn desired_projection(&self, existing: &AgentPoolProjection) -> AgentPoolProjection {
        AgentPoolProjection {
            count: if self.autoscaling_enabled() {
                existing.count
            } else {
                Some(self.replicas)
            },
            orchestrator_version: self.version.clone(),
            mode: Some(self.mode),
            enable_auto_scaling: self.enable_auto_scaling,
            min_count: self.min_count,
            max_count: self.max_count,
            node_labels: self.node_labels.clone(),
            node_taints: existing.node_taints.clone(),
        }
    }

    fn payload(&self, node_labels: Option<BTreeMap<String, String>>) -> AgentPool {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

        AgentPool {
            id: None,
            name: None,
            properties: Some(AgentPoolProperties {
                availability_zones: (!self.availability_zones.is_empty())
                    .then(|| self.availability_zones.clone()),
                count: (self.replicas > 0).then_some(self.replicas),
                enable_auto_scaling: self.enable_auto_scaling,
                enable_ultra_ssd: self.enable_ultra_ssd,
                max_count: self.max_count,
                max_pods: self.max_pods,
                min_count: self.min_count,
                mode: Some(self.mode),
                node_labels,
                node_taints: (!self.node_taints.is_empty()).then(|| self.node_taints.clone()),
                orchestrator_version: self.version.clone(),
                os_disk_size_gb: Some(self.os_disk_size_gb),
                os_disk_type: self.os_disk_type.clone(),
                os_type: self.os_type.clone(),
                scale_set_priority: self.scale_set_priority.clone(),
                pool_type: Some(SCALE_SET_POOL_TYPE.to_string()),
                vm_size: non_empty(&self.sku),
                vnet_subnet_id: non_empty(&self.vnet_subnet_id),
                enable_node_public_ip: self.enable_node_public_ip,
                node_public_ip_prefix_id: self.node_public_ip_prefix_id.clone(),
                provisioning_state: None,
            }),
        }
    }
}

impl ResourceSpec for AgentPoolSpec {
    type Object = AgentPool;

    const KIND: &'static str = "agent pool";

    fn resource_name(&self) -> &str {
        &self.name
    }

    fn resource_group_name(&self) -> &str {
        &self.resource_group
    }

    fn owner_resource_name(&self) -> Option<&str> {
        Some(&self.cluster)
    }

    fn custom_headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    fn parameters(
        &self,
        ctx: &ParameterContext<'_>,
        existing: Option<&AgentPool>,
    ) -> Result<Option<AgentPool>, ProvisionerError> {
        let mut node_labels = self.node_labels.clone();

        if let Some(existing) = existing {
            ensure_terminal(
                existing.provisioning_state(),
                Self::KIND,
                ctx.config.not_terminal_retry_after(),
            )?;

            let properties = existing.properties.clone().unwrap_or_default();
            let existing_projection = AgentPoolProjection::from_existing(&properties);
            let desired_projection = self.desired_projection(&existing_projection);

            let drift = diff(&desired_projection, &existing_projection)?;
            if drift.is_empty() {
                tracing::debug!(agent_pool = %self.name, "agent pool is up to date");
                return Ok(None);
            }
            for d in &drift {
                tracing::debug!(agent_pool = %self.name, drift = %d, "agent pool drift");
            }

            // Labels injected by the managed cluster service are merged back
            // in so the update doesn't strip them.
            if let Some(desired) = &desired_projection.node_labels {
                node_labels = Some(merge_system_labels(
                    desired,
                    properties.node_labels.as_ref(),
                    &ctx.config.system_label_prefix,
                ));
            }
        }

        Ok(Some(self.payload(node_labels)))
    }
}
