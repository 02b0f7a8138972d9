//! Provisioning state for one in-flight attempt
//!
//! The orchestrator owns one `ProvisioningState` per request: append-only
//! during the forward pass, drained in reverse during rollback, discarded
//! when the attempt completes. It is never shared across requests and never
//! persisted.

use std::fmt;

use provisioner_common::ResourceKind;

/// External identifier of one successfully created resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceId {
    /// Bucket name
    Bucket(String),
    /// Role name (deletes go by name; the ARN only appears in the receipt)
    Role(String),
    /// Log group name
    LogGroup(String),
    /// Function name
    Function(String),
    /// Rule name
    EventRule(String),
    /// Topic ARN
    Topic(String),
    /// Both alarm names; created and rolled back as one unit
    Alarms(Vec<String>),
}

impl ResourceId {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceId::Bucket(_) => ResourceKind::Bucket,
            ResourceId::Role(_) => ResourceKind::Role,
            ResourceId::LogGroup(_) => ResourceKind::LogGroup,
            ResourceId::Function(_) => ResourceKind::Function,
            ResourceId::EventRule(_) => ResourceKind::EventRule,
            ResourceId::Topic(_) => ResourceKind::Topic,
            ResourceId::Alarms(_) => ResourceKind::Alarm,
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Bucket(name)
            | ResourceId::Role(name)
            | ResourceId::LogGroup(name)
            | ResourceId::Function(name)
            | ResourceId::EventRule(name)
            | ResourceId::Topic(name) => write!(f, "{} '{}'", self.kind(), name),
            ResourceId::Alarms(names) => write!(f, "alarms '{}'", names.join("', '")),
        }
    }
}

/// Ordered record of what the current attempt has created so far.
///
/// Invariant: never contains a resource whose creation did not return
/// success (the event rule is recorded after rule creation succeeds, even
/// though target attachment may still fail).
#[derive(Debug, Default)]
pub struct ProvisioningState {
    created: Vec<ResourceId>,
}

impl ProvisioningState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a successfully created resource.
    pub fn record(&mut self, resource: ResourceId) {
        self.created.push(resource);
    }

    /// Take every recorded resource in reverse creation order (LIFO),
    /// leaving the state empty.
    pub fn drain_reverse(&mut self) -> Vec<ResourceId> {
        let mut resources = std::mem::take(&mut self.created);
        resources.reverse();
        resources
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }

    pub fn len(&self) -> usize {
        self.created.len()
    }
}
