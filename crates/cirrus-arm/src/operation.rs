//! Long-running operation polling.
//!
//! ARM acknowledges a mutation before it finishes. Depending on what the
//! response carries, completion is observed through the
//! `Azure-AsyncOperation` status document, the `Location` URL, or the
//! resource itself.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use cirrus_core::models::ProvisioningState;
use cirrus_provisioner::{BoxFuture, Operation, ProvisionerError, WaitOptions};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ArmError;
use crate::transport::{ErrorDetail, Transport, retry_after};

pub const AZURE_ASYNC_OPERATION: &str = "Azure-AsyncOperation";
pub const LOCATION: &str = "Location";

/// Where to look for completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollTarget {
    /// Status document with `status`: `InProgress`, `Succeeded`, ...
    AsyncOperation(Url),
    /// 202 while running, 200/204 when done.
    Location(Url),
    /// The resource's own `properties.provisioningState`.
    ProvisioningState(Url),
    /// The resource URL until it returns 404.
    Gone(Url),
}

impl PollTarget {
    fn url(&self) -> &Url {
        match self {
            Self::AsyncOperation(url)
            | Self::Location(url)
            | Self::ProvisioningState(url)
            | Self::Gone(url) => url,
        }
    }
}

enum Progress {
    Done,
    Running(Option<Duration>),
}

#[derive(Debug, Deserialize)]
struct AsyncOperationStatus {
    status: String,
    #[serde(default)]
    error: Option<ErrorDetail>,
}

pub(crate) struct Poller {
    transport: Arc<Transport>,
    target: PollTarget,
    /// Delay requested by the initial response, honored before the first poll.
    initial_delay: Option<Duration>,
    kind: &'static str,
    name: String,
}

impl Poller {
    pub(crate) fn new(
        transport: Arc<Transport>,
        target: PollTarget,
        initial_delay: Option<Duration>,
        kind: &'static str,
        name: &str,
    ) -> Self {
        Self {
            transport,
            target,
            initial_delay,
            kind,
            name: name.to_string(),
        }
    }

    async fn wait(&mut self, options: WaitOptions) -> Result<(), ArmError> {
        if let Some(delay) = self.initial_delay.take() {
            tokio::time::sleep(delay).await;
        }

        loop {
            match self.poll_once().await? {
                Progress::Done => {
                    tracing::debug!(kind = self.kind, name = %self.name, "operation complete");
                    return Ok(());
                }
                Progress::Running(hint) => {
                    let delay = hint.unwrap_or(options.poll_interval);
                    tracing::debug!(
                        kind = self.kind,
                        name = %self.name,
                        url = %self.target.url(),
                        delay_secs = delay.as_secs(),
                        "operation in progress"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn poll_once(&self) -> Result<Progress, ArmError> {
        match &self.target {
            PollTarget::AsyncOperation(url) => {
                let response = self.transport.get(url).await?;
                let hint = retry_after(response.headers());
                let body = response.bytes().await?;
                let status: AsyncOperationStatus = serde_json::from_slice(&body)?;

                match ProvisioningState::from(status.status) {
                    ProvisioningState::Succeeded => Ok(Progress::Done),
                    state @ (ProvisioningState::Failed | ProvisioningState::Canceled) => {
                        Err(ArmError::OperationFailed {
                            state: state.to_string(),
                            message: status
                                .error
                                .and_then(|e| e.message)
                                .unwrap_or_else(|| "no error details".to_string()),
                        })
                    }
                    _ => Ok(Progress::Running(hint)),
                }
            }
            PollTarget::Location(url) => {
                let response = self.transport.get(url).await?;
                if response.status() == StatusCode::ACCEPTED {
                    Ok(Progress::Running(retry_after(response.headers())))
                } else {
                    Ok(Progress::Done)
                }
            }
            PollTarget::ProvisioningState(url) => {
                let response = self.transport.get(url).await?;
                let hint = retry_after(response.headers());
                let body = response.bytes().await?;
                let resource: serde_json::Value = serde_json::from_slice(&body)?;

                let state = resource
                    .pointer("/properties/provisioningState")
                    .and_then(serde_json::Value::as_str)
                    .map(ProvisioningState::from);
                match state {
                    // Nothing to wait for if the provider doesn't report one.
                    None | Some(ProvisioningState::Succeeded) => Ok(Progress::Done),
                    Some(state @ (ProvisioningState::Failed | ProvisioningState::Canceled)) => {
                        Err(ArmError::OperationFailed {
                            state: state.to_string(),
                            message: format!("{} {} did not provision", self.kind, self.name),
                        })
                    }
                    Some(_) => Ok(Progress::Running(hint)),
                }
            }
            PollTarget::Gone(url) => match self.transport.get(url).await {
                Ok(response) => Ok(Progress::Running(retry_after(response.headers()))),
                Err(e) if e.is_not_found() => Ok(Progress::Done),
                Err(e) => Err(e),
            },
        }
    }
}

/// A create-or-update in flight. `result` re-reads the resource.
pub struct PutOperation<T> {
    poller: Poller,
    resource_url: Url,
    _object: PhantomData<fn() -> T>,
}

impl<T> PutOperation<T> {
    pub(crate) fn new(poller: Poller, resource_url: Url) -> Self {
        Self {
            poller,
            resource_url,
            _object: PhantomData,
        }
    }
}

impl<T: DeserializeOwned + Send> Operation<T> for PutOperation<T> {
    fn wait(&mut self, options: WaitOptions) -> BoxFuture<'_, Result<(), ProvisionerError>> {
        Box::pin(async move { Ok(self.poller.wait(options).await?) })
    }

    fn result(&mut self) -> BoxFuture<'_, Result<T, ProvisionerError>> {
        Box::pin(async move {
            let response = self.poller.transport.get(&self.resource_url).await?;
            let body = response.bytes().await.map_err(ArmError::from)?;
            Ok(serde_json::from_slice(&body).map_err(ArmError::from)?)
        })
    }
}

/// A delete acknowledged with 202.
pub struct DeleteOperation {
    poller: Poller,
}

impl DeleteOperation {
    pub(crate) fn new(poller: Poller) -> Self {
        Self { poller }
    }
}

impl Operation<()> for DeleteOperation {
    fn wait(&mut self, options: WaitOptions) -> BoxFuture<'_, Result<(), ProvisionerError>> {
        Box::pin(async move { Ok(self.poller.wait(options).await?) })
    }

    fn result(&mut self) -> BoxFuture<'_, Result<(), ProvisionerError>> {
        Box::pin(async { Ok(()) })
    }
}
