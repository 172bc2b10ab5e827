use std::marker::PhantomData;
use std::sync::Arc;

use crate::client::{OperationHandle, ResourceClient, ResourceRef, WaitOptions};
use crate::config::ProvisionerConfig;
use crate::dependency::{DependencyLookup, NoDependencies};
use crate::error::{ProvisionerError, Step, format_err_chain};
use crate::spec::{ParameterContext, ResolvedDependencies, ResourceSpec};

/// Outcome of a successful [`Service::reconcile`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled<T> {
    /// The remote object already matched; nothing was submitted.
    Unchanged,
    /// A create-or-update completed; carries the object the provider returned.
    Applied(T),
}

impl<T> Reconciled<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

/// Outcome of a successful [`Service::delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deleted {
    Removed,
    AlreadyAbsent,
}

/// Drives one resource kind through get / reconcile / delete.
///
/// Holds no per-resource state: every attempt re-reads the remote object,
/// so one service can reconcile many specs concurrently.
pub struct Service<S, C> {
    client: C,
    lookup: Arc<dyn DependencyLookup>,
    config: Arc<ProvisionerConfig>,
    _spec: PhantomData<fn(&S)>,
}

impl<S, C> Service<S, C>
where
    S: ResourceSpec,
    C: ResourceClient<S>,
{
    pub fn new(client: C, config: Arc<ProvisionerConfig>) -> Self {
        Self {
            client,
            lookup: Arc::new(NoDependencies),
            config,
            _spec: PhantomData,
        }
    }

    /// Use `lookup` to resolve the spec's dependencies before building parameters.
    pub fn with_lookup(mut self, lookup: Arc<dyn DependencyLookup>) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn config(&self) -> &ProvisionerConfig {
        &self.config
    }

    /// Fetch the current remote object. `Ok(None)` if it doesn't exist.
    pub async fn get(&self, spec: &S) -> Result<Option<S::Object>, ProvisionerError> {
        let resource = spec.resource_ref();
        match self.client.get(&resource).await {
            Ok(object) => Ok(Some(object)),
            Err(e) if e.is_not_found() => {
                tracing::debug!(
                    kind = S::KIND,
                    resource_group = %resource.resource_group,
                    name = %resource.name,
                    "resource not found"
                );
                Ok(None)
            }
            Err(e) => Err(wrap::<S>(e, Step::Get, &resource)),
        }
    }

    /// Create or update the remote object until it matches `spec`.
    pub async fn reconcile(&self, spec: &S) -> Result<Reconciled<S::Object>, ProvisionerError> {
        let resource = spec.resource_ref();
        let existing = self.get(spec).await?;
        let dependencies = self.resolve_dependencies(spec, &resource).await?;

        let ctx = ParameterContext {
            config: &self.config,
            dependencies: &dependencies,
        };
        let payload = spec
            .parameters(&ctx, existing.as_ref())
            .map_err(|e| wrap::<S>(e, Step::Parameters, &resource))?;

        let Some(payload) = payload else {
            tracing::debug!(
                kind = S::KIND,
                resource_group = %resource.resource_group,
                name = %resource.name,
                "resource up to date, nothing to do"
            );
            return Ok(Reconciled::Unchanged);
        };

        tracing::info!(
            kind = S::KIND,
            resource_group = %resource.resource_group,
            name = %resource.name,
            exists = existing.is_some(),
            "creating or updating resource"
        );
        let mut operation = self
            .client
            .create_or_update(&resource, payload, spec.custom_headers())
            .await
            .map_err(|e| wrap::<S>(e, Step::CreateOrUpdate, &resource))?;

        self.wait(&mut operation, &resource).await?;
        let object = operation
            .result()
            .await
            .map_err(|e| wrap::<S>(e, Step::Result, &resource))?;

        tracing::info!(
            kind = S::KIND,
            resource_group = %resource.resource_group,
            name = %resource.name,
            "successfully created or updated resource"
        );
        Ok(Reconciled::Applied(object))
    }

    /// Delete the remote object. Deleting an absent resource succeeds.
    pub async fn delete(&self, spec: &S) -> Result<Deleted, ProvisionerError> {
        let resource = spec.resource_ref();

        tracing::info!(
            kind = S::KIND,
            resource_group = %resource.resource_group,
            name = %resource.name,
            "deleting resource"
        );
        let mut operation = match self.client.delete(&resource).await {
            Ok(operation) => operation,
            Err(e) if e.is_not_found() => {
                tracing::debug!(
                    kind = S::KIND,
                    resource_group = %resource.resource_group,
                    name = %resource.name,
                    "resource already deleted"
                );
                return Ok(Deleted::AlreadyAbsent);
            }
            Err(e) => return Err(wrap::<S>(e, Step::Delete, &resource)),
        };

        self.wait(&mut operation, &resource).await?;
        operation
            .result()
            .await
            .map_err(|e| wrap::<S>(e, Step::Result, &resource))?;

        tracing::info!(
            kind = S::KIND,
            resource_group = %resource.resource_group,
            name = %resource.name,
            "successfully deleted resource"
        );
        Ok(Deleted::Removed)
    }

    /// Look up every dependency afresh. A missing one fails the attempt.
    async fn resolve_dependencies(
        &self,
        spec: &S,
        resource: &ResourceRef,
    ) -> Result<ResolvedDependencies, ProvisionerError> {
        let mut resolved = ResolvedDependencies::new();
        for dependency in spec.dependencies() {
            let id = self
                .lookup
                .resolve(&dependency)
                .await
                .map_err(|e| wrap::<S>(e, Step::ResolveDependency, resource))?;
            resolved.insert(dependency, id);
        }
        Ok(resolved)
    }

    async fn wait<T>(
        &self,
        operation: &mut OperationHandle<T>,
        resource: &ResourceRef,
    ) -> Result<(), ProvisionerError> {
        let options = WaitOptions {
            poll_interval: self.config.poll_interval(),
        };
        let timeout = self.config.operation_timeout();

        match tokio::time::timeout(timeout, operation.wait(options)).await {
            Ok(result) => result.map_err(|e| {
                tracing::warn!(
                    kind = S::KIND,
                    resource_group = %resource.resource_group,
                    name = %resource.name,
                    error = %format_err_chain(&e),
                    "long-running operation failed"
                );
                wrap::<S>(e, Step::Wait, resource)
            }),
            Err(_) => Err(wrap::<S>(
                ProvisionerError::Transport {
                    status: None,
                    message: format!(
                        "long-running operation did not complete within {}s",
                        timeout.as_secs()
                    ),
                },
                Step::Wait,
                resource,
            )),
        }
    }
}

fn wrap<S: ResourceSpec>(err: ProvisionerError, step: Step, resource: &ResourceRef) -> ProvisionerError {
    err.with_context(step, S::KIND, &resource.resource_group, &resource.name)
}
