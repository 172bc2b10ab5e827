use std::time::Duration;

use cirrus_provisioner::ProvisionerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArmError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("failed to acquire access token: {0}")]
    Credential(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ARM returned HTTP {status}: {}", status_message(.code, .message))]
    Status {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("request throttled, retry after {}s", .retry_after.as_secs())]
    Throttled { retry_after: Duration },

    #[error("long-running operation ended in state {state}: {message}")]
    OperationFailed { state: String, message: String },

    #[error("{0} requires an owning resource name")]
    MissingOwner(&'static str),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

fn status_message(code: &Option<String>, message: &str) -> String {
    match code {
        Some(code) => format!("{code}: {message}"),
        None => message.to_string(),
    }
}

impl ArmError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Throttled { .. } => Some(429),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<ArmError> for ProvisionerError {
    fn from(err: ArmError) -> Self {
        match err {
            ArmError::Throttled { retry_after } => ProvisionerError::Transient {
                message: "request throttled by Azure Resource Manager".to_string(),
                retry_after,
            },
            ArmError::MissingOwner(_) => ProvisionerError::Validation(err.to_string()),
            ArmError::Decode(e) => ProvisionerError::Serialization(e),
            other => ProvisionerError::Transport {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}
