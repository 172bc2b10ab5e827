use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ProvisionerError;

/// Retry hint returned when a resource is still being mutated remotely.
pub const DEFAULT_NOT_TERMINAL_RETRY_AFTER: Duration = Duration::from_secs(20);

/// Tunables injected into the reconciliation service.
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionerConfig {
    /// Admin user created on every Linux VM.
    pub admin_username: String,
    /// Appended to the machine name to form the OS disk name.
    pub os_disk_suffix: String,
    /// Node labels under this prefix are owned by the managed cluster service.
    pub system_label_prefix: String,
    pub not_terminal_retry_after_secs: u64,
    /// Upper bound on waiting for one long-running operation.
    pub operation_timeout_secs: u64,
    /// Used when the provider gives no `Retry-After` hint while polling.
    pub poll_interval_secs: u64,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            admin_username: "capi".to_string(),
            os_disk_suffix: "_OSDisk".to_string(),
            system_label_prefix: "kubernetes.azure.com".to_string(),
            not_terminal_retry_after_secs: DEFAULT_NOT_TERMINAL_RETRY_AFTER.as_secs(),
            operation_timeout_secs: 3600,
            poll_interval_secs: 15,
        }
    }
}

impl ProvisionerConfig {
    pub fn from_json(json: &str) -> Result<Self, ProvisionerError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ProvisionerError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json(&contents)?;
        tracing::debug!(path = %path.display(), "provisioner config loaded");
        Ok(config)
    }

    pub fn os_disk_name(&self, machine_name: &str) -> String {
        format!("{machine_name}{}", self.os_disk_suffix)
    }

    pub fn authorized_keys_path(&self) -> String {
        format!("/home/{}/.ssh/authorized_keys", self.admin_username)
    }

    pub fn not_terminal_retry_after(&self) -> Duration {
        Duration::from_secs(self.not_terminal_retry_after_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
