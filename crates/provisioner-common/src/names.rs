//! Deterministic resource name derivation
//!
//! Every externally visible identifier is a pure function of
//! (environment, client id). Names are recomputed on every invocation and
//! never persisted, which keeps creation and cleanup correlated even across
//! separate attempts.

use serde::Serialize;

/// The full set of resource names for one client in one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceNames {
    pub bucket: String,
    pub role: String,
    pub log_group: String,
    pub function: String,
    pub event_rule: String,
    pub topic: String,
    pub error_alarm: String,
    pub log_volume_alarm: String,
}

impl ResourceNames {
    /// Derive every resource name for `client_id` in `environment`.
    ///
    /// Pure and total: invalid client ids must be rejected by request
    /// validation before this is called, not here. Distinct
    /// (environment, client id) pairs map to distinct name sets.
    pub fn for_client(environment: &str, client_id: &str) -> Self {
        Self {
            bucket: format!("{environment}-{client_id}-bucket"),
            role: format!("{environment}-{client_id}-role"),
            log_group: format!("{environment}-{client_id}-logs"),
            function: format!("{environment}-{client_id}-log-processor"),
            event_rule: format!("{environment}-{client_id}-log-rule"),
            topic: format!("{environment}-{client_id}-alerts"),
            error_alarm: format!("{client_id}-error-rate-alarm"),
            log_volume_alarm: format!("{client_id}-log-volume-alarm"),
        }
    }

    /// Name of the role's inline policy.
    pub fn role_policy(&self) -> String {
        format!("{}-policy", self.role)
    }
}

/// ARN of an IAM role that may not exist yet.
///
/// The bucket's access policy references the role by ARN before the role is
/// created, so the ARN has to be derivable from the name alone.
pub fn role_arn(account_id: &str, role_name: &str) -> String {
    format!("arn:aws:iam::{account_id}:role/{role_name}")
}

/// ARN of an S3 bucket (bucket ARNs are account- and region-free).
pub fn bucket_arn(bucket_name: &str) -> String {
    format!("arn:aws:s3:::{bucket_name}")
}

/// ARN of an SNS topic.
pub fn topic_arn(region: &str, account_id: &str, topic_name: &str) -> String {
    format!("arn:aws:sns:{region}:{account_id}:{topic_name}")
}

/// ARN pattern matching every log stream in a log group.
pub fn log_group_arn(region: &str, account_id: &str, log_group: &str) -> String {
    format!("arn:aws:logs:{region}:{account_id}:log-group:{log_group}:*")
}
