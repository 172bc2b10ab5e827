use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Coarse classification callers use to pick a retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The resource does not exist remotely.
    NotFound,
    /// Expected to resolve with time; carries a retry hint.
    Transient,
    /// Malformed or incomplete spec; retrying without a fix is pointless.
    Validation,
    /// Network or remote API failure.
    Provider,
    /// The secure random source failed.
    Secret,
}

/// The reconciliation step an error happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Get,
    CreateOrUpdate,
    Delete,
    Wait,
    Result,
    Parameters,
    ResolveDependency,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "get",
            Self::CreateOrUpdate => "create or update",
            Self::Delete => "delete",
            Self::Wait => "wait for",
            Self::Result => "read result of",
            Self::Parameters => "build parameters for",
            Self::ResolveDependency => "resolve dependencies of",
        })
    }
}

#[derive(Debug, Error)]
pub enum ProvisionerError {
    #[error("{kind} not found: {resource_group}/{name}")]
    NotFound {
        kind: String,
        resource_group: String,
        name: String,
    },

    #[error("{message} (retry after {}s)", .retry_after.as_secs())]
    Transient {
        message: String,
        retry_after: Duration,
    },

    #[error("invalid resource spec: {0}")]
    Validation(String),

    #[error("dependency {kind} {resource_group}/{name} does not exist")]
    DependencyMissing {
        kind: String,
        resource_group: String,
        name: String,
    },

    #[error("{}", transport_message(.status, .message))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    #[error("failed to generate {secret}: {message}")]
    SecretGeneration {
        secret: &'static str,
        message: String,
    },

    #[error("failed to {step} {kind} {name} in resource group {resource_group}")]
    Context {
        step: Step,
        kind: String,
        resource_group: String,
        name: String,
        #[source]
        source: Box<ProvisionerError>,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn transport_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("remote API error (HTTP {status}): {message}"),
        None => format!("remote API error: {message}"),
    }
}

impl From<cirrus_core::CoreError> for ProvisionerError {
    fn from(err: cirrus_core::CoreError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl ProvisionerError {
    /// Wrap with the identity of the resource and the operation that failed.
    pub fn with_context(
        self,
        step: Step,
        kind: &str,
        resource_group: &str,
        name: &str,
    ) -> Self {
        Self::Context {
            step,
            kind: kind.to_string(),
            resource_group: resource_group.to_string(),
            name: name.to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any context wrappers.
    pub fn root(&self) -> &ProvisionerError {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Transient { .. } => ErrorKind::Transient,
            Self::Validation(_) | Self::DependencyMissing { .. } => ErrorKind::Validation,
            Self::SecretGeneration { .. } => ErrorKind::Secret,
            Self::Transport { .. } | Self::Serialization(_) | Self::Io(_) => ErrorKind::Provider,
            Self::Context { .. } => ErrorKind::Provider,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }

    /// Suggested minimum delay before the next attempt, if the error carries one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self.root() {
            Self::Transient { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    /// Whether a later attempt may succeed without changing the spec.
    ///
    /// Provider errors are left to the caller's retry policy, so they count
    /// as retryable; validation and secret failures do not.
    pub fn is_retryable(&self) -> bool {
        match self.kind() {
            ErrorKind::Transient | ErrorKind::Provider => true,
            ErrorKind::NotFound | ErrorKind::Validation | ErrorKind::Secret => false,
        }
    }
}

/// Walk the full error chain and join all causes into one string.
pub fn format_err_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
