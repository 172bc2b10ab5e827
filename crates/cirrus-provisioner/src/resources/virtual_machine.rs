use std::collections::BTreeMap;

use cirrus_core::models::{
    HardwareProfile, Image, ImageReference, LinuxConfiguration, ManagedDiskParameters,
    NetworkInterfaceReference, NetworkInterfaceReferenceProperties, NetworkProfile, OsDisk,
    OsProfile, SshConfiguration, SshPublicKey, StorageProfile, VirtualMachine,
    VirtualMachineProperties,
};
use cirrus_core::tags::{ResourceLifecycle, TagParams, Tags, cloud_provider_tag_key};
use serde::Serialize;

use crate::config::ProvisionerConfig;
use crate::diff::{diff, ensure_terminal};
use crate::error::ProvisionerError;
use crate::secrets;
use crate::spec::{Dependency, ParameterContext, ResourceSpec};

/// Length in bytes of the generated admin password before encoding.
const ADMIN_PASSWORD_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsDiskSpec {
    /// `Linux` or `Windows`.
    pub os_type: String,
    pub disk_size_gb: i32,
    /// e.g. `Premium_LRS`
    pub storage_account_type: String,
}

/// Desired state of a single virtual machine.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualMachineSpec {
    pub name: String,
    pub resource_group: String,
    pub location: String,
    /// Network interface the VM attaches to as its primary NIC.
    pub nic_name: String,
    /// Generated at creation when unset.
    pub ssh_public_key: Option<String>,
    /// Generated at creation when unset.
    pub admin_password: Option<String>,
    pub size: String,
    pub zone: Option<String>,
    pub image: Image,
    pub os_disk: OsDiskSpec,
    /// Base64 bootstrap data.
    pub custom_data: Option<String>,
    pub tags: Tags,
}

/// Mutable fields of a VM we compare to decide whether to update.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct VirtualMachineProjection {
    vm_size: Option<String>,
    tags: BTreeMap<String, String>,
}

impl VirtualMachineSpec {
    /// Ownership tags for a machine, including the cloud provider claim.
    pub fn machine_tags(
        cluster_name: &str,
        machine_name: &str,
        role: &str,
        additional: &Tags,
    ) -> Tags {
        Tags::build(TagParams {
            cluster_name: cluster_name.to_string(),
            lifecycle: ResourceLifecycle::Owned,
            name: Some(machine_name.to_string()),
            role: Some(role.to_string()),
            additional: additional.with(
                cloud_provider_tag_key(machine_name),
                ResourceLifecycle::Owned.as_str(),
            ),
        })
    }

    fn nic_dependency(&self) -> Dependency {
        Dependency::network_interface(&self.resource_group, &self.nic_name)
    }

    fn projection(&self) -> VirtualMachineProjection {
        VirtualMachineProjection {
            vm_size: Some(self.size.clone()),
            tags: self.tags.to_map(),
        }
    }

    fn storage_profile(&self, config: &ProvisionerConfig) -> Result<StorageProfile, ProvisionerError> {
        let image = self.image.resolve()?;

        Ok(StorageProfile {
            image_reference: Some(ImageReference::from(image)),
            os_disk: Some(OsDisk {
                name: Some(config.os_disk_name(&self.name)),
                os_type: Some(self.os_disk.os_type.clone()),
                create_option: Some("FromImage".to_string()),
                disk_size_gb: Some(self.os_disk.disk_size_gb),
                managed_disk: Some(ManagedDiskParameters {
                    storage_account_type: Some(self.os_disk.storage_account_type.clone()),
                }),
            }),
        })
    }

    /// OS profile for a new VM. Secrets are only generated for unset fields.
    fn os_profile(&self, config: &ProvisionerConfig) -> Result<OsProfile, ProvisionerError> {
        let key_data = match &self.ssh_public_key {
            Some(key) if !key.is_empty() => key.clone(),
            _ => secrets::generate_ssh_public_key()?,
        };
        let admin_password = match &self.admin_password {
            Some(password) if !password.is_empty() => password.clone(),
            _ => secrets::generate_random_string(ADMIN_PASSWORD_BYTES)?,
        };

        Ok(OsProfile {
            computer_name: Some(self.name.clone()),
            admin_username: Some(config.admin_username.clone()),
            admin_password: Some(admin_password),
            custom_data: self.custom_data.clone(),
            linux_configuration: Some(LinuxConfiguration {
                ssh: Some(SshConfiguration {
                    public_keys: vec![SshPublicKey {
                        path: config.authorized_keys_path(),
                        key_data,
                    }],
                }),
            }),
        })
    }

    fn network_profile(&self, nic_id: &str) -> NetworkProfile {
        NetworkProfile {
            network_interfaces: vec![NetworkInterfaceReference {
                id: Some(nic_id.to_string()),
                properties: Some(NetworkInterfaceReferenceProperties {
                    primary: Some(true),
                }),
            }],
        }
    }
}

impl ResourceSpec for VirtualMachineSpec {
    type Object = VirtualMachine;

    const KIND: &'static str = "virtual machine";

    fn resource_name(&self) -> &str {
        &self.name
    }

    fn resource_group_name(&self) -> &str {
        &self.resource_group
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![self.nic_dependency()]
    }

    fn parameters(
        &self,
        ctx: &ParameterContext<'_>,
        existing: Option<&VirtualMachine>,
    ) -> Result<Option<VirtualMachine>, ProvisionerError> {
        let nic_id = ctx.dependencies.id(&self.nic_dependency())?;

        // Storage and OS profiles are immutable once the VM exists, so an
        // update only carries the mutable parts.
        let (storage_profile, os_profile) = match existing {
            Some(existing) => {
                ensure_terminal(
                    existing.provisioning_state(),
                    Self::KIND,
                    ctx.config.not_terminal_retry_after(),
                )?;

                let existing_projection = VirtualMachineProjection {
                    vm_size: existing.vm_size().map(String::from),
                    tags: existing.tags.clone().unwrap_or_default(),
                };
                let drift = diff(&self.projection(), &existing_projection)?;
                if drift.is_empty() {
                    tracing::debug!(vm = %self.name, "virtual machine is up to date");
                    return Ok(None);
                }
                for d in &drift {
                    tracing::debug!(vm = %self.name, drift = %d, "virtual machine drift");
                }
                (None, None)
            }
            None => (
                Some(self.storage_profile(ctx.config)?),
                Some(self.os_profile(ctx.config)?),
            ),
        };

        tracing::debug!(vm = %self.name, zone = ?self.zone, "setting zone");

        Ok(Some(VirtualMachine {
            id: None,
            name: None,
            location: Some(self.location.clone()),
            tags: Some(self.tags.to_map()),
            zones: self.zone.as_ref().filter(|z| !z.is_empty()).map(|z| vec![z.clone()]),
            properties: Some(VirtualMachineProperties {
                hardware_profile: Some(HardwareProfile {
                    vm_size: Some(self.size.clone()),
                }),
                storage_profile,
                os_profile,
                network_profile: Some(self.network_profile(nic_id)),
                provisioning_state: None,
            }),
        }))
    }
}
