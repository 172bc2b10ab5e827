use std::marker::PhantomData;

use crate::client::{BoxFuture, ResourceClient, ResourceRef};
use crate::error::ProvisionerError;
use crate::resources::NetworkInterfaceSpec;
use crate::spec::{Dependency, DependencyKind};

/// Resolves referenced sub-resources to their resource ids.
pub trait DependencyLookup: Send + Sync {
    fn resolve<'a>(
        &'a self,
        dependency: &'a Dependency,
    ) -> BoxFuture<'a, Result<String, ProvisionerError>>;
}

/// Lookup for specs that reference nothing; any request is a missing dependency.
pub struct NoDependencies;

impl DependencyLookup for NoDependencies {
    fn resolve<'a>(
        &'a self,
        dependency: &'a Dependency,
    ) -> BoxFuture<'a, Result<String, ProvisionerError>> {
        Box::pin(async move {
            Err(ProvisionerError::DependencyMissing {
                kind: dependency.kind.to_string(),
                resource_group: dependency.resource_group.clone(),
                name: dependency.name.clone(),
            })
        })
    }
}

/// Looks up network interfaces through a network-interface client.
pub struct NetworkInterfaceLookup<C> {
    client: C,
    _spec: PhantomData<fn() -> NetworkInterfaceSpec>,
}

impl<C> NetworkInterfaceLookup<C>
where
    C: ResourceClient<NetworkInterfaceSpec>,
{
    pub fn new(client: C) -> Self {
        Self {
            client,
            _spec: PhantomData,
        }
    }
}

impl<C> DependencyLookup for NetworkInterfaceLookup<C>
where
    C: ResourceClient<NetworkInterfaceSpec>,
{
    fn resolve<'a>(
        &'a self,
        dependency: &'a Dependency,
    ) -> BoxFuture<'a, Result<String, ProvisionerError>> {
        Box::pin(async move {
            if dependency.kind != DependencyKind::NetworkInterface {
                return Err(ProvisionerError::Validation(format!(
                    "cannot look up {} {} through a network interface client",
                    dependency.kind, dependency.name
                )));
            }

            let resource = ResourceRef {
                resource_group: dependency.resource_group.clone(),
                owner: None,
                name: dependency.name.clone(),
            };

            tracing::debug!(nic = %dependency.name, "getting network interface");
            let nic = self.client.get(&resource).await.map_err(|e| {
                if e.is_not_found() {
                    ProvisionerError::DependencyMissing {
                        kind: dependency.kind.to_string(),
                        resource_group: dependency.resource_group.clone(),
                        name: dependency.name.clone(),
                    }
                } else {
                    e
                }
            })?;

            let id = nic.id.ok_or_else(|| {
                ProvisionerError::Validation(format!(
                    "network interface {} has no resource id",
                    dependency.name
                ))
            })?;
            tracing::debug!(nic = %dependency.name, "got network interface");
            Ok(id)
        })
    }
}
