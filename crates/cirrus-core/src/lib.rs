//! cirrus-core
//!
//! Pure domain types: Azure Resource Manager object models, image
//! descriptors, provisioning states and ownership tags.
//! No HTTP dependency. Shared vocabulary of the cirrus workspace.

pub mod error;
pub mod models;
pub mod tags;

pub use crate::error::CoreError;
