use std::fmt;

use serde::{Deserialize, Serialize};

/// `provisioningState` as reported by Azure Resource Manager.
///
/// Only `Succeeded`, `Failed` and `Canceled` are terminal. Anything else
/// means another operation is still mutating the resource remotely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProvisioningState {
    Succeeded,
    Failed,
    Canceled,
    Creating,
    Updating,
    Deleting,
    Scaling,
    Upgrading,
    Other(String),
}

impl ProvisioningState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Canceled => "Canceled",
            Self::Creating => "Creating",
            Self::Updating => "Updating",
            Self::Deleting => "Deleting",
            Self::Scaling => "Scaling",
            Self::Upgrading => "Upgrading",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for ProvisioningState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            // ARM uses both spellings depending on the resource provider.
            "Canceled" | "Cancelled" => Self::Canceled,
            "Creating" => Self::Creating,
            "Updating" => Self::Updating,
            "Deleting" => Self::Deleting,
            "Scaling" => Self::Scaling,
            "Upgrading" => Self::Upgrading,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for ProvisioningState {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<ProvisioningState> for String {
    fn from(value: ProvisioningState) -> Self {
        match value {
            ProvisioningState::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
