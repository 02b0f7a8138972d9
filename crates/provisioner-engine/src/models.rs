//! Request and response types for the provisioning pipeline

use serde::Serialize;

use crate::error::ProvisionError;

/// Onboarding request for one client.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    /// Short identifier, becomes part of every resource name
    pub client_id: String,
    /// Human-readable name, informational only
    pub client_name: String,
}

impl ProvisionRequest {
    /// Validate before any remote call is made.
    ///
    /// Client ids feed directly into resource names, so the charset is
    /// restricted to what every downstream naming rule accepts.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        if self.client_id.is_empty() {
            return Err(ProvisionError::Validation(
                "client_id must not be empty".to_string(),
            ));
        }
        if !self
            .client_id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ProvisionError::Validation(format!(
                "client_id '{}' may only contain lowercase letters, digits and hyphens",
                self.client_id
            )));
        }
        if self.client_name.trim().is_empty() {
            return Err(ProvisionError::Validation(
                "client_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Identifiers of everything a successful provisioning run created.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReceipt {
    pub status: &'static str,
    pub bucket_name: String,
    pub role_arn: String,
    pub log_group_name: String,
    pub function_arn: String,
    pub event_rule_name: String,
    pub topic_arn: String,
}
