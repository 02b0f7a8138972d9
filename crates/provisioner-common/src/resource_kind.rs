//! Resource kinds and the fixed provisioning order
//!
//! Later steps consume identifiers produced by earlier ones, so the forward
//! order is a strict dependency chain. Rollback always runs in the exact
//! reverse of the order in which resources were actually created.

use std::fmt;

/// Kinds of remote resources managed per client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// S3 bucket holding the client's processed logs
    Bucket,
    /// IAM role granting bucket and log access
    Role,
    /// CloudWatch log group collecting the client's logs
    LogGroup,
    /// Lambda function processing log events into the bucket
    Function,
    /// EventBridge rule routing log events to the function
    EventRule,
    /// SNS topic receiving alarm notifications
    Topic,
    /// CloudWatch alarm pair (error rate + log volume, one unit)
    Alarm,
}

/// Forward provisioning order. Each step may reference identifiers of
/// resources earlier in this slice, never later ones.
pub const PROVISION_ORDER: &[ResourceKind] = &[
    ResourceKind::Bucket,
    ResourceKind::Role,
    ResourceKind::LogGroup,
    ResourceKind::Function,
    ResourceKind::EventRule,
    ResourceKind::Topic,
    ResourceKind::Alarm,
];

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Bucket => "bucket",
            ResourceKind::Role => "role",
            ResourceKind::LogGroup => "log-group",
            ResourceKind::Function => "function",
            ResourceKind::EventRule => "event-rule",
            ResourceKind::Topic => "topic",
            ResourceKind::Alarm => "alarm",
        }
    }

    /// Whether this kind needs a propagation wait after creation before
    /// dependent steps can safely reference it.
    pub fn needs_propagation_wait(self) -> bool {
        matches!(self, ResourceKind::Bucket | ResourceKind::Role)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
