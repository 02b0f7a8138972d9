//! Provisioning error taxonomy and remote error classification
//!
//! Remote API failures are classified by error code using typed metadata
//! rather than string matching on Debug output. Every failure in this crate
//! resolves to a returned error value; nothing here aborts the process.

use provisioner_common::ResourceKind;
use thiserror::Error;

use crate::state::ResourceId;

/// Classified provisioning error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProvisionError {
    /// Bad input, surfaced before any remote call is made.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Resource does not exist. Surfaced on create-dependency lookups and
    /// deletes; drivers treat it as success when deleting.
    #[error("{kind} '{identifier}' not found")]
    NotFound {
        kind: ResourceKind,
        identifier: String,
    },

    /// Resource already exists. A failure on create; success on delete.
    #[error("{kind} '{identifier}' already exists")]
    Conflict {
        kind: ResourceKind,
        identifier: String,
    },

    /// Remote call failed but is safe to retry with the same arguments.
    #[error("transient failure on {kind} '{identifier}': {message}")]
    Transient {
        kind: ResourceKind,
        identifier: String,
        message: String,
    },

    /// Bounded propagation wait exhausted; the resource was created but
    /// never became observably usable.
    #[error("'{resource}' did not become ready after {attempts} attempts")]
    PropagationTimeout { resource: String, attempts: u32 },

    /// The caller's cancellation signal fired mid-attempt.
    #[error("provisioning cancelled while handling {context}")]
    Cancelled { context: String },

    /// Non-retryable remote rejection.
    #[error("permanent failure on {kind} '{identifier}': {message}")]
    Permanent {
        kind: ResourceKind,
        identifier: String,
        code: Option<String>,
        message: String,
    },
}

impl ProvisionError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProvisionError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ProvisionError::Conflict { .. })
    }

    /// Whether retrying the same call is safe. Only the bounded propagation
    /// wait retries; creates and deletes are never retried automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProvisionError::Transient { .. })
    }
}

/// A delete issued during compensation that itself failed.
///
/// Aggregated and reported alongside the original failure; never masks it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("rollback of {resource} failed: {error}")]
pub struct RollbackError {
    pub resource: ResourceId,
    pub error: ProvisionError,
}

/// Terminal failure of one provisioning attempt.
///
/// Carries the step that failed, the triggering error, and the outcome of
/// every compensating delete. The attempt is `Failed` regardless of whether
/// rollback itself fully succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionFailure {
    /// Step at which the forward pass stopped; `None` when validation
    /// failed before any step ran.
    pub step: Option<ResourceKind>,
    pub cause: ProvisionError,
    pub rollback_errors: Vec<RollbackError>,
}

impl ProvisionFailure {
    pub fn before_start(cause: ProvisionError) -> Self {
        Self {
            step: None,
            cause,
            rollback_errors: Vec::new(),
        }
    }

    /// Whether every compensating delete succeeded.
    pub fn rolled_back_cleanly(&self) -> bool {
        self.rollback_errors.is_empty()
    }
}

impl std::fmt::Display for ProvisionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.step {
            Some(step) => write!(f, "provisioning failed at {step} step: {}", self.cause)?,
            None => write!(f, "provisioning rejected: {}", self.cause)?,
        }
        if self.rollback_errors.is_empty() {
            write!(f, "; cleanup of prior steps completed")
        } else {
            write!(
                f,
                "; cleanup incomplete, {} resource(s) left behind: ",
                self.rollback_errors.len()
            )?;
            let mut first = true;
            for err in &self.rollback_errors {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{}", err.resource)?;
                first = false;
            }
            Ok(())
        }
    }
}

impl std::error::Error for ProvisionFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// Known remote error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &[
    "NoSuchBucket",
    "NoSuchKey",
    "NoSuchEntity",
    "NotFound",
    "NotFoundException",
    "ResourceNotFoundException",
];

/// Known remote error codes for "already exists" conditions
const ALREADY_EXISTS_CODES: &[&str] = &[
    "BucketAlreadyExists",
    "BucketAlreadyOwnedByYou",
    "EntityAlreadyExists",
    "ResourceAlreadyExistsException",
    "ResourceConflictException",
    "ResourceInUseException",
];

/// Known remote error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "RequestLimitExceeded",
    "TooManyRequestsException",
    "ServiceUnavailable",
];

/// Classify a remote API error by its error code.
///
/// Unknown codes are treated as permanent: retrying a rejected create with
/// the same parameters will not help.
pub fn classify_aws_error(
    kind: ResourceKind,
    identifier: &str,
    code: Option<&str>,
    message: Option<&str>,
) -> ProvisionError {
    let message = message.unwrap_or("unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => ProvisionError::NotFound {
            kind,
            identifier: identifier.to_string(),
        },
        Some(c) if ALREADY_EXISTS_CODES.contains(&c) => ProvisionError::Conflict {
            kind,
            identifier: identifier.to_string(),
        },
        Some(c) if THROTTLING_CODES.contains(&c) => ProvisionError::Transient {
            kind,
            identifier: identifier.to_string(),
            message,
        },
        code => ProvisionError::Permanent {
            kind,
            identifier: identifier.to_string(),
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}
