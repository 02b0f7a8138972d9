//! provisioner-engine - Client infrastructure provisioning orchestrator
//!
//! Provisions the full per-client resource chain (bucket, role, log group,
//! log-processor function, event rule, alert topic, alarms) in a fixed
//! order, and compensates on failure by deleting everything the attempt
//! created in exact reverse order.

pub mod client;
pub mod config;
pub mod drivers;
pub mod error;
pub mod models;
pub mod saga;
pub mod state;
pub mod wait;

pub use client::{AwsContext, AwsResourceClient, ResourceClient};
pub use config::ProvisionerConfig;
pub use error::{ProvisionError, ProvisionFailure, RollbackError};
pub use models::{ProvisionReceipt, ProvisionRequest};
pub use saga::Provisioner;
