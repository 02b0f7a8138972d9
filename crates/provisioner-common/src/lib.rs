//! provisioner-common - Shared types for client resource provisioning
//!
//! This crate holds the pure, I/O-free building blocks shared across the
//! provisioning engine: resource kinds, the naming strategy, typed policy
//! documents, and the standard resource tag schema. It deliberately has no
//! AWS SDK dependencies.
//!
//! ## Modules
//!
//! - [`resource_kind`]: Resource kinds and the fixed provisioning order
//! - [`names`]: Deterministic resource name derivation per client
//! - [`policy`]: Typed IAM/SNS policy documents
//! - [`tags`]: Resource tag constants for discovery and cleanup

pub mod names;
pub mod policy;
pub mod resource_kind;
pub mod tags;

pub use names::{bucket_arn, log_group_arn, role_arn, topic_arn, ResourceNames};
pub use policy::{Effect, PolicyDocument, Principal, Statement};
pub use resource_kind::{ResourceKind, PROVISION_ORDER};
