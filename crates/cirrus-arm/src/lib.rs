//! cirrus-arm
//!
//! Azure Resource Manager REST transport. Implements the provisioner's
//! `ResourceClient` over HTTPS for agent pools, virtual machines and
//! network interfaces, including long-running operation polling.

pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod operation;
pub mod resource;
mod transport;

pub use crate::client::ArmClient;
pub use crate::config::ArmConfig;
pub use crate::credential::{StaticToken, TokenCredential};
pub use crate::error::ArmError;
pub use crate::resource::ArmResource;
