use cirrus_provisioner::{
    AgentPoolSpec, NetworkInterfaceSpec, ResourceRef, ResourceSpec, VirtualMachineSpec,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ArmError;

/// A resource kind addressable through Azure Resource Manager.
pub trait ArmResource: ResourceSpec<Object: Serialize + DeserializeOwned> {
    const API_VERSION: &'static str;

    /// Path segments after `/subscriptions/{id}/`.
    fn path_segments(resource: &ResourceRef) -> Result<Vec<String>, ArmError>;
}

fn resource_group_segments(resource: &ResourceRef, provider: &str) -> Vec<String> {
    vec![
        "resourceGroups".to_string(),
        resource.resource_group.clone(),
        "providers".to_string(),
        provider.to_string(),
    ]
}

impl ArmResource for AgentPoolSpec {
    const API_VERSION: &'static str = "2021-05-01";

    fn path_segments(resource: &ResourceRef) -> Result<Vec<String>, ArmError> {
        let cluster = resource
            .owner
            .clone()
            .ok_or(ArmError::MissingOwner(Self::KIND))?;

        let mut segments = resource_group_segments(resource, "Microsoft.ContainerService");
        segments.extend([
            "managedClusters".to_string(),
            cluster,
            "agentPools".to_string(),
            resource.name.clone(),
        ]);
        Ok(segments)
    }
}

impl ArmResource for VirtualMachineSpec {
    const API_VERSION: &'static str = "2019-07-01";

    fn path_segments(resource: &ResourceRef) -> Result<Vec<String>, ArmError> {
        let mut segments = resource_group_segments(resource, "Microsoft.Compute");
        segments.extend(["virtualMachines".to_string(), resource.name.clone()]);
        Ok(segments)
    }
}

impl ArmResource for NetworkInterfaceSpec {
    const API_VERSION: &'static str = "2019-06-01";

    fn path_segments(resource: &ResourceRef) -> Result<Vec<String>, ArmError> {
        let mut segments = resource_group_segments(resource, "Microsoft.Network");
        segments.extend(["networkInterfaces".to_string(), resource.name.clone()]);
        Ok(segments)
    }
}

/// Full request URL for `resource`, including the `api-version` query.
///
/// Segments are percent-encoded, so names can't escape their path position.
pub fn resource_url<S: ArmResource>(
    endpoint: &Url,
    subscription_id: &str,
    resource: &ResourceRef,
) -> Result<Url, ArmError> {
    let segments = S::path_segments(resource)?;

    let mut url = endpoint.clone();
    url.path_segments_mut()
        .map_err(|()| ArmError::InvalidEndpoint(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .push("subscriptions")
        .push(subscription_id)
        .extend(segments);
    url.query_pairs_mut()
        .append_pair("api-version", S::API_VERSION);
    Ok(url)
}
