use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::ProvisionerError;
use crate::spec::ResourceSpec;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Where a resource lives: resource group, optional parent, and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    pub resource_group: String,
    /// Parent resource for nested types, e.g. the managed cluster of an agent pool.
    pub owner: Option<String>,
    pub name: String,
}

/// Explicit knobs for waiting on a long-running operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Delay between status polls when the provider gives no hint.
    pub poll_interval: Duration,
}

/// Handle to a long-running remote operation.
///
/// Owned by a single reconciliation attempt and dropped afterwards; nothing
/// about it is persisted. Dropping the future returned by `wait` abandons
/// polling without touching remote state.
pub trait Operation<T>: Send {
    /// Block until the remote operation reaches a terminal state.
    fn wait(&mut self, options: WaitOptions) -> BoxFuture<'_, Result<(), ProvisionerError>>;

    /// The final object, fetched once after `wait` resolves.
    fn result(&mut self) -> BoxFuture<'_, Result<T, ProvisionerError>>;
}

pub type OperationHandle<T> = Box<dyn Operation<T>>;

/// An operation that finished synchronously, e.g. a delete answered with 204.
pub struct Completed<T> {
    value: Option<T>,
}

impl<T> Completed<T> {
    pub fn new(value: T) -> Self {
        Self { value: Some(value) }
    }
}

impl<T: Send + 'static> Completed<T> {
    pub fn boxed(value: T) -> OperationHandle<T> {
        Box::new(Self::new(value))
    }
}

impl<T: Send> Operation<T> for Completed<T> {
    fn wait(&mut self, _options: WaitOptions) -> BoxFuture<'_, Result<(), ProvisionerError>> {
        Box::pin(async { Ok(()) })
    }

    fn result(&mut self) -> BoxFuture<'_, Result<T, ProvisionerError>> {
        Box::pin(async {
            self.value.take().ok_or_else(|| ProvisionerError::Transport {
                status: None,
                message: "operation result already consumed".to_string(),
            })
        })
    }
}

/// Remote API for one resource kind.
///
/// `get` reports an absent resource as [`ProvisionerError::NotFound`]; the
/// service turns that into `None`.
pub trait ResourceClient<S: ResourceSpec>: Send + Sync {
    fn get<'a>(
        &'a self,
        resource: &'a ResourceRef,
    ) -> BoxFuture<'a, Result<S::Object, ProvisionerError>>;

    fn create_or_update<'a>(
        &'a self,
        resource: &'a ResourceRef,
        payload: S::Object,
        headers: &'a BTreeMap<String, String>,
    ) -> BoxFuture<'a, Result<OperationHandle<S::Object>, ProvisionerError>>;

    fn delete<'a>(
        &'a self,
        resource: &'a ResourceRef,
    ) -> BoxFuture<'a, Result<OperationHandle<()>, ProvisionerError>>;
}
