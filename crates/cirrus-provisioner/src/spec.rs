use std::collections::BTreeMap;
use std::fmt;

use crate::client::ResourceRef;
use crate::config::ProvisionerConfig;
use crate::error::ProvisionerError;

static NO_HEADERS: BTreeMap<String, String> = BTreeMap::new();

/// Desired state of one remote resource, constructed fresh per attempt.
///
/// Implemented by each resource kind the service can drive. The service is
/// generic over this trait, so handing it the wrong kind is a compile error.
pub trait ResourceSpec: Send + Sync {
    /// Provider document used both as the fetched state and as the payload.
    type Object: Clone + Send + Sync + 'static;

    /// Human-readable kind, e.g. "agent pool".
    const KIND: &'static str;

    fn resource_name(&self) -> &str;

    fn resource_group_name(&self) -> &str;

    /// Parent resource for nested kinds.
    fn owner_resource_name(&self) -> Option<&str> {
        None
    }

    /// Extra transport headers for the create-or-update call.
    fn custom_headers(&self) -> &BTreeMap<String, String> {
        &NO_HEADERS
    }

    /// Sub-resources whose ids must be looked up before `parameters`.
    fn dependencies(&self) -> Vec<Dependency> {
        Vec::new()
    }

    /// Render the create-or-update payload.
    ///
    /// `Ok(None)` means `existing` already matches and nothing should be
    /// submitted. Must not depend on anything but `self`, `ctx` and
    /// `existing`, apart from secrets generated for unset fields.
    fn parameters(
        &self,
        ctx: &ParameterContext<'_>,
        existing: Option<&Self::Object>,
    ) -> Result<Option<Self::Object>, ProvisionerError>;

    fn resource_ref(&self) -> ResourceRef {
        ResourceRef {
            resource_group: self.resource_group_name().to_string(),
            owner: self.owner_resource_name().map(String::from),
            name: self.resource_name().to_string(),
        }
    }
}

/// Everything `parameters` may read besides the spec and the existing object.
#[derive(Debug, Clone, Copy)]
pub struct ParameterContext<'a> {
    pub config: &'a ProvisionerConfig,
    pub dependencies: &'a ResolvedDependencies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DependencyKind {
    NetworkInterface,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NetworkInterface => f.write_str("network interface"),
        }
    }
}

/// A referenced sub-resource, e.g. the NIC a VM attaches to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dependency {
    pub kind: DependencyKind,
    pub resource_group: String,
    pub name: String,
}

impl Dependency {
    pub fn network_interface(resource_group: &str, name: &str) -> Self {
        Self {
            kind: DependencyKind::NetworkInterface,
            resource_group: resource_group.to_string(),
            name: name.to_string(),
        }
    }
}

/// Resource ids of dependencies looked up for the current attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedDependencies {
    ids: BTreeMap<Dependency, String>,
}

impl ResolvedDependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dependency: Dependency, id: String) {
        self.ids.insert(dependency, id);
    }

    pub fn id(&self, dependency: &Dependency) -> Result<&str, ProvisionerError> {
        self.ids
            .get(dependency)
            .map(String::as_str)
            .ok_or_else(|| ProvisionerError::DependencyMissing {
                kind: dependency.kind.to_string(),
                resource_group: dependency.resource_group.clone(),
                name: dependency.name.clone(),
            })
    }
}
