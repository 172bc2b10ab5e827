use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ArmError;

pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// Connection settings for Azure Resource Manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmConfig {
    /// Base URL; overridden for sovereign clouds and tests.
    pub endpoint: String,
    pub subscription_id: String,
    pub request_timeout_secs: u64,
    /// Retry hint for a 429 without `Retry-After`.
    pub throttle_retry_after_secs: u64,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            subscription_id: String::new(),
            request_timeout_secs: 60,
            throttle_retry_after_secs: 30,
        }
    }
}

impl ArmConfig {
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ArmError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn throttle_retry_after(&self) -> Duration {
        Duration::from_secs(self.throttle_retry_after_secs)
    }
}
