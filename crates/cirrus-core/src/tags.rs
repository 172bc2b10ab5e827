//! Ownership tags stamped on every resource we create.
//!
//! `Tags` is an immutable value: builders return a new set instead of
//! mutating a shared map, so one attempt can thread the same tags through
//! several layers without surprises.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix shared by all provider-owned tag keys.
pub const PROVIDER_TAG_PREFIX: &str = "sigs.k8s.io_cluster-api-provider-azure_";

/// Tag key holding the machine role (`control-plane`, `node`, ...).
pub const ROLE_TAG_KEY: &str = "sigs.k8s.io_cluster-api-provider-azure_role";

/// Prefix of the tag the in-cluster cloud provider uses to claim resources.
pub const CLOUD_PROVIDER_TAG_PREFIX: &str = "kubernetes.io_cluster_";

pub const NAME_TAG_KEY: &str = "Name";

/// Tag key marking a resource as belonging to `cluster_name`.
pub fn cluster_tag_key(cluster_name: &str) -> String {
    format!("{PROVIDER_TAG_PREFIX}cluster_{cluster_name}")
}

/// Tag key the cloud provider looks for on resources it may manage.
pub fn cloud_provider_tag_key(name: &str) -> String {
    format!("{CLOUD_PROVIDER_TAG_PREFIX}{name}")
}

/// Whether the cluster owns a resource or merely shares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceLifecycle {
    Owned,
    Shared,
}

impl ResourceLifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owned => "owned",
            Self::Shared => "shared",
        }
    }
}

impl fmt::Display for ResourceLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs to [`Tags::build`].
#[derive(Debug, Clone)]
pub struct TagParams {
    pub cluster_name: String,
    pub lifecycle: ResourceLifecycle,
    pub name: Option<String>,
    pub role: Option<String>,
    pub additional: Tags,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard ownership tag set. Additional tags are applied first, so the
    /// ownership keys always win on collision.
    pub fn build(params: TagParams) -> Self {
        let mut tags = params.additional.0;
        tags.insert(
            cluster_tag_key(&params.cluster_name),
            params.lifecycle.as_str().to_string(),
        );
        if let Some(role) = params.role {
            tags.insert(ROLE_TAG_KEY.to_string(), role);
        }
        if let Some(name) = params.name {
            tags.insert(NAME_TAG_KEY.to_string(), name);
        }
        Self(tags)
    }

    /// A copy of this set with one more entry.
    pub fn with(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut tags = self.0.clone();
        tags.insert(key.into(), value.into());
        Self(tags)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.0.clone()
    }
}

impl From<BTreeMap<String, String>> for Tags {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
