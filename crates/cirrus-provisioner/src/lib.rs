//! cirrus-provisioner
//!
//! Reconciliation core that converges declared Azure resources onto the
//! state held by Azure Resource Manager.
//!
//! Public API:
//! - `Service::get()`: fetch the remote object, `None` if absent
//! - `Service::reconcile()`: fetch, diff, and create-or-update when needed
//! - `Service::delete()`: delete, treating an absent resource as success
//!
//! Resource kinds implement [`ResourceSpec`]; the remote API is reached
//! through [`ResourceClient`] and long-running [`Operation`] handles.

pub mod client;
pub mod config;
pub mod dependency;
pub mod diff;
pub mod error;
pub mod resources;
pub mod secrets;
pub mod service;
pub mod spec;

pub use crate::client::{
    BoxFuture, Completed, Operation, OperationHandle, ResourceClient, ResourceRef, WaitOptions,
};
pub use crate::config::ProvisionerConfig;
pub use crate::dependency::{DependencyLookup, NetworkInterfaceLookup, NoDependencies};
pub use crate::diff::FieldDrift;
pub use crate::error::{ErrorKind, ProvisionerError, Step};
pub use crate::resources::{AgentPoolSpec, NetworkInterfaceSpec, OsDiskSpec, VirtualMachineSpec};
pub use crate::service::{Deleted, Reconciled, Service};
pub use crate::spec::{Dependency, DependencyKind, ParameterContext, ResolvedDependencies, ResourceSpec};
