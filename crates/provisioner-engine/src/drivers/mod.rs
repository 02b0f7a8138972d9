//! Per-resource-kind provisioning steps
//!
//! Each driver knows how to build the creation parameters for its kind
//! (including policy documents that reference sibling resources by derived
//! identifier), how to probe readiness where the provider is eventually
//! consistent, and how to delete idempotently: a missing resource is a
//! successful delete.
//!
//! Drivers are stateless; the orchestrator passes the facade and the step
//! context into every call.

pub mod alarm;
pub mod bucket;
pub mod event_rule;
pub mod function;
pub mod log_group;
pub mod role;
pub mod topic;

use provisioner_common::{policy::PolicyDocument, ResourceKind, ResourceNames};

use crate::error::ProvisionError;

/// Identifiers shared by every step of one provisioning attempt.
#[derive(Debug, Clone)]
pub struct StepContext<'a> {
    pub names: &'a ResourceNames,
    pub environment: &'a str,
    pub region: &'a str,
    pub account_id: &'a str,
    pub client_id: &'a str,
}

/// Serialize a policy document, mapping the (unreachable in practice)
/// serialization failure onto the step's resource.
fn policy_json(
    kind: ResourceKind,
    identifier: &str,
    doc: &PolicyDocument,
) -> Result<String, ProvisionError> {
    doc.to_json().map_err(|e| ProvisionError::Permanent {
        kind,
        identifier: identifier.to_string(),
        code: None,
        message: format!("failed to serialize policy document: {e}"),
    })
}

/// Treat a missing resource as a completed delete.
fn ignore_not_found(result: Result<(), ProvisionError>) -> Result<(), ProvisionError> {
    match result {
        Err(e) if e.is_not_found() => Ok(()),
        other => other,
    }
}
