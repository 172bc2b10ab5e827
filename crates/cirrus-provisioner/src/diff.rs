//! Structural comparison of normalized projections.
//!
//! Each resource kind reduces both its desired spec and the existing remote
//! object to the same projection struct holding only fields it controls.
//! Maps and sets in a projection are `BTreeMap`/`BTreeSet`, so ordering never
//! shows up as drift. Both sides are serialized and walked field by field.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use cirrus_core::models::ProvisioningState;
use serde::Serialize;
use serde_json::Value;

use crate::error::ProvisionerError;

/// Before/after for a single field that doesn't match desired state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDrift {
    /// Dotted path into the projection, e.g. "node_labels.pool"
    pub field: String,
    /// What we want
    pub expected: Value,
    /// What the provider has
    pub actual: Value,
}

impl fmt::Display for FieldDrift {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.field, self.actual, self.expected)
    }
}

/// Compare two projections. Empty result means "in sync".
pub fn diff<T: Serialize>(desired: &T, existing: &T) -> Result<Vec<FieldDrift>, ProvisionerError> {
    let desired = serde_json::to_value(desired)?;
    let existing = serde_json::to_value(existing)?;

    let mut drift = Vec::new();
    walk("", &desired, &existing, &mut drift);
    Ok(drift)
}

fn walk(path: &str, desired: &Value, existing: &Value, drift: &mut Vec<FieldDrift>) {
    match (desired, existing) {
        (Value::Object(want), Value::Object(have)) => {
            // serde_json::Map is sorted, so the merged key walk is deterministic
            let mut keys: Vec<&String> = want.keys().chain(have.keys()).collect();
            keys.sort();
            keys.dedup();

            for key in keys {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                walk(
                    &child,
                    want.get(key).unwrap_or(&Value::Null),
                    have.get(key).unwrap_or(&Value::Null),
                    drift,
                );
            }
        }
        (want, have) if want != have => drift.push(FieldDrift {
            field: path.to_string(),
            expected: want.clone(),
            actual: have.clone(),
        }),
        _ => {}
    }
}

/// Refuse to compute an update while another operation is in flight remotely.
///
/// A missing provisioning state counts as non-terminal.
pub fn ensure_terminal(
    state: Option<&ProvisioningState>,
    kind: &str,
    retry_after: Duration,
) -> Result<(), ProvisionerError> {
    match state {
        Some(state) if state.is_terminal() => Ok(()),
        state => {
            let actual = state.map_or("unknown", ProvisioningState::as_str);
            tracing::warn!(kind, state = actual, "existing resource is not in a terminal state");
            Err(ProvisionerError::Transient {
                message: format!(
                    "unable to update existing {kind} in non terminal state. \
                     {kind} must be in one of the following provisioning states: \
                     Canceled, Failed, or Succeeded. Actual state: {actual}"
                ),
                retry_after,
            })
        }
    }
}

/// Carry over labels owned by the remote control plane.
///
/// Keys in `existing` starting with `prefix` are kept even though the spec
/// never declared them; everything else comes from `desired`.
pub fn merge_system_labels(
    desired: &BTreeMap<String, String>,
    existing: Option<&BTreeMap<String, String>>,
    prefix: &str,
) -> BTreeMap<String, String> {
    let mut merged = desired.clone();
    if let Some(existing) = existing {
        merged.extend(
            existing
                .iter()
                .filter(|(key, _)| key.starts_with(prefix))
                .map(|(k, v)| (k.clone(), v.clone())),
        );
    }
    merged
}
