use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use cirrus_provisioner::{
    BoxFuture, Completed, OperationHandle, ProvisionerError, ResourceClient, ResourceRef,
};
use reqwest::StatusCode;
use url::Url;

use crate::config::ArmConfig;
use crate::credential::TokenCredential;
use crate::error::ArmError;
use crate::operation::{
    AZURE_ASYNC_OPERATION, DeleteOperation, LOCATION, PollTarget, Poller, PutOperation,
};
use crate::resource::{ArmResource, resource_url};
use crate::transport::{Transport, header_url, retry_after};

/// ARM client for one resource kind.
///
/// Clones and clients derived with [`ArmClient::for_kind`] share the
/// connection pool and credential.
pub struct ArmClient<S> {
    transport: Arc<Transport>,
    endpoint: Url,
    subscription_id: String,
    _spec: PhantomData<fn() -> S>,
}

impl<S> Clone for ArmClient<S> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            endpoint: self.endpoint.clone(),
            subscription_id: self.subscription_id.clone(),
            _spec: PhantomData,
        }
    }
}

impl<S: ArmResource> ArmClient<S> {
    pub fn new(config: &ArmConfig, credential: Arc<dyn TokenCredential>) -> Result<Self, ArmError> {
        let endpoint = Url::parse(&config.endpoint)?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        tracing::debug!(
            endpoint = %endpoint,
            subscription_id = %config.subscription_id,
            "ARM client created"
        );
        Ok(Self {
            transport: Arc::new(Transport::new(
                http,
                credential,
                config.throttle_retry_after(),
            )),
            endpoint,
            subscription_id: config.subscription_id.clone(),
            _spec: PhantomData,
        })
    }

    /// A client for another resource kind on the same connection.
    pub fn for_kind<T: ArmResource>(&self) -> ArmClient<T> {
        ArmClient {
            transport: Arc::clone(&self.transport),
            endpoint: self.endpoint.clone(),
            subscription_id: self.subscription_id.clone(),
            _spec: PhantomData,
        }
    }

    pub fn url(&self, resource: &ResourceRef) -> Result<Url, ArmError> {
        resource_url::<S>(&self.endpoint, &self.subscription_id, resource)
    }

    fn classify(err: ArmError, resource: &ResourceRef) -> ProvisionerError {
        if err.is_not_found() {
            ProvisionerError::NotFound {
                kind: S::KIND.to_string(),
                resource_group: resource.resource_group.clone(),
                name: resource.name.clone(),
            }
        } else {
            err.into()
        }
    }

    fn poller(
        &self,
        target: PollTarget,
        initial_delay: Option<Duration>,
        resource: &ResourceRef,
    ) -> Poller {
        Poller::new(
            Arc::clone(&self.transport),
            target,
            initial_delay,
            S::KIND,
            &resource.name,
        )
    }
}

impl<S: ArmResource> ResourceClient<S> for ArmClient<S> {
    fn get<'a>(
        &'a self,
        resource: &'a ResourceRef,
    ) -> BoxFuture<'a, Result<S::Object, ProvisionerError>> {
        Box::pin(async move {
            let url = self.url(resource)?;
            tracing::debug!(kind = S::KIND, name = %resource.name, "GET resource");

            let response = self
                .transport
                .get(&url)
                .await
                .map_err(|e| Self::classify(e, resource))?;
            let body = response.bytes().await.map_err(ArmError::from)?;
            Ok(serde_json::from_slice(&body).map_err(ArmError::from)?)
        })
    }

    fn create_or_update<'a>(
        &'a self,
        resource: &'a ResourceRef,
        payload: S::Object,
        headers: &'a BTreeMap<String, String>,
    ) -> BoxFuture<'a, Result<OperationHandle<S::Object>, ProvisionerError>> {
        Box::pin(async move {
            let url = self.url(resource)?;

            let mut request = self.transport.http.put(url.clone()).json(&payload);
            for (name, value) in headers {
                request = request.header(name.as_str(), value.as_str());
            }

            tracing::debug!(
                kind = S::KIND,
                name = %resource.name,
                custom_headers = headers.len(),
                "PUT resource"
            );
            let response = self
                .transport
                .send(request)
                .await
                .map_err(|e| Self::classify(e, resource))?;

            let target = match header_url(response.headers(), AZURE_ASYNC_OPERATION) {
                Some(status_url) => PollTarget::AsyncOperation(status_url),
                None => PollTarget::ProvisioningState(url.clone()),
            };
            let delay = retry_after(response.headers());

            let operation: OperationHandle<S::Object> = Box::new(PutOperation::new(
                self.poller(target, delay, resource),
                url,
            ));
            Ok(operation)
        })
    }

    fn delete<'a>(
        &'a self,
        resource: &'a ResourceRef,
    ) -> BoxFuture<'a, Result<OperationHandle<()>, ProvisionerError>> {
        Box::pin(async move {
            let url = self.url(resource)?;
            tracing::debug!(kind = S::KIND, name = %resource.name, "DELETE resource");

            let response = self
                .transport
                .send(self.transport.http.delete(url.clone()))
                .await
                .map_err(|e| Self::classify(e, resource))?;

            if response.status() != StatusCode::ACCEPTED {
                return Ok(Completed::boxed(()));
            }

            let headers = response.headers();
            let target = header_url(headers, AZURE_ASYNC_OPERATION)
                .map(PollTarget::AsyncOperation)
                .or_else(|| header_url(headers, LOCATION).map(PollTarget::Location))
                .unwrap_or(PollTarget::Gone(url));
            let delay = retry_after(headers);

            let operation: OperationHandle<()> =
                Box::new(DeleteOperation::new(self.poller(target, delay, resource)));
            Ok(operation)
        })
    }
}
