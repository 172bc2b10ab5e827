use std::collections::BTreeSet;

use cirrus_core::models::{
    IpConfiguration, IpConfigurationProperties, NetworkInterface, NetworkInterfaceProperties,
    SubResource,
};
use cirrus_core::tags::Tags;
use serde::Serialize;

use crate::diff::{diff, ensure_terminal};
use crate::error::ProvisionerError;
use crate::spec::{ParameterContext, ResourceSpec};

const IP_CONFIGURATION_NAME: &str = "pipConfig";

/// Desired state of a network interface with a single IP configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkInterfaceSpec {
    pub name: String,
    pub resource_group: String,
    pub location: String,
    pub subnet_id: String,
    /// Static address; dynamic allocation when unset.
    pub static_ip_address: Option<String>,
    pub accelerated_networking: Option<bool>,
    pub backend_address_pool_ids: Vec<String>,
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct NetworkInterfaceProjection {
    subnet_id: Option<String>,
    private_ip_allocation_method: Option<String>,
    private_ip_address: Option<String>,
    accelerated_networking: Option<bool>,
    backend_address_pool_ids: BTreeSet<String>,
}

impl NetworkInterfaceProjection {
    fn from_existing(existing: &NetworkInterface) -> Self {
        let ip = existing.primary_ip_configuration();
        let method = ip.and_then(|c| c.private_ip_allocation_method.clone());
        let is_static = method.as_deref() == Some("Static");

        Self {
            subnet_id: ip.and_then(|c| c.subnet.as_ref()).and_then(|s| s.id.clone()),
            // A dynamic address is provider-assigned; only a static one is ours.
            private_ip_address: if is_static {
                ip.and_then(|c| c.private_ip_address.clone())
            } else {
                None
            },
            private_ip_allocation_method: method,
            accelerated_networking: existing
                .properties
                .as_ref()
                .and_then(|p| p.enable_accelerated_networking),
            backend_address_pool_ids: ip
                .and_then(|c| c.load_balancer_backend_address_pools.as_ref())
                .map(|pools| pools.iter().filter_map(|p| p.id.clone()).collect())
                .unwrap_or_default(),
        }
    }
}

impl NetworkInterfaceSpec {
    fn allocation_method(&self) -> &'static str {
        if self.static_ip_address.is_some() {
            "Static"
        } else {
            "Dynamic"
        }
    }

    fn projection(&self) -> NetworkInterfaceProjection {
        NetworkInterfaceProjection {
            subnet_id: Some(self.subnet_id.clone()),
            private_ip_allocation_method: Some(self.allocation_method().to_string()),
            private_ip_address: self.static_ip_address.clone(),
            accelerated_networking: self.accelerated_networking,
            backend_address_pool_ids: self.backend_address_pool_ids.iter().cloned().collect(),
        }
    }

    fn payload(&self) -> NetworkInterface {
        let pools = (!self.backend_address_pool_ids.is_empty()).then(|| {
            self.backend_address_pool_ids
                .iter()
                .map(SubResource::new)
                .collect()
        });

        NetworkInterface {
            id: None,
            name: None,
            location: Some(self.location.clone()),
            tags: Some(self.tags.to_map()),
            properties: Some(NetworkInterfaceProperties {
                ip_configurations: Some(vec![IpConfiguration {
                    name: Some(IP_CONFIGURATION_NAME.to_string()),
                    properties: Some(IpConfigurationProperties {
                        subnet: Some(SubResource::new(&self.subnet_id)),
                        private_ip_allocation_method: Some(self.allocation_method().to_string()),
                        private_ip_address: self.static_ip_address.clone(),
                        primary: Some(true),
                        load_balancer_backend_address_pools: pools,
                    }),
                }]),
                enable_accelerated_networking: self.accelerated_networking,
                provisioning_state: None,
            }),
        }
    }
}

impl ResourceSpec for NetworkInterfaceSpec {
    type Object = NetworkInterface;

    const KIND: &'static str = "network interface";

    fn resource_name(&self) -> &str {
        &self.name
    }

    fn resource_group_name(&self) -> &str {
        &self.resource_group
    }

    fn parameters(
        &self,
        ctx: &ParameterContext<'_>,
        existing: Option<&NetworkInterface>,
    ) -> Result<Option<NetworkInterface>, ProvisionerError> {
        if let Some(existing) = existing {
            ensure_terminal(
                existing.provisioning_state(),
                Self::KIND,
                ctx.config.not_terminal_retry_after(),
            )?;

            let drift = diff(
                &self.projection(),
                &NetworkInterfaceProjection::from_existing(existing),
            )?;
            if drift.is_empty() {
                tracing::debug!(nic = %self.name, "network interface is up to date");
                return Ok(None);
            }
            for d in &drift {
                tracing::debug!(nic = %self.name, drift = %d, "network interface drift");
            }
        }

        Ok(Some(self.payload()))
    }
}
