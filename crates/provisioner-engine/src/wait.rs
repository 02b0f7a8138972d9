//! Bounded readiness polling with cancellation support
//!
//! Newly created buckets and roles are not immediately observable by
//! dependent services, so the pipeline polls at a fixed interval until the
//! resource answers or the attempt budget runs out. Uses `tokio::select!`
//! so a cancellation fires promptly even mid-sleep.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ProvisionError;

/// Fixed-interval polling budget.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Maximum number of readiness checks before giving up
    pub max_attempts: u32,
    /// Delay between consecutive checks
    pub interval: Duration,
}

impl WaitConfig {
    /// Budget for bucket availability after creation.
    pub fn bucket() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(2),
        }
    }

    /// Budget for role propagation; IAM is slower to converge than S3.
    pub fn role() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(5),
        }
    }
}

/// Poll `check` until it reports ready, the budget is exhausted, or the
/// caller cancels.
///
/// A resource ready on attempt `k` costs exactly `k` checks and `k - 1`
/// sleeps; there is no sleep after the final failed attempt. A retryable
/// probe error (throttling) counts as not-ready and consumes one attempt;
/// any other error propagates immediately.
pub async fn wait_until_ready<F, Fut>(
    config: &WaitConfig,
    cancel: Option<&CancellationToken>,
    resource_name: &str,
    check: F,
) -> Result<(), ProvisionError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool, ProvisionError>>,
{
    for attempt in 1..=config.max_attempts {
        if let Some(token) = cancel {
            if token.is_cancelled() {
                return Err(ProvisionError::Cancelled {
                    context: format!("wait for '{resource_name}'"),
                });
            }
        }

        match check().await {
            Ok(true) => {
                debug!(resource = %resource_name, attempt, "resource ready");
                return Ok(());
            }
            Ok(false) => {}
            Err(e) if e.is_retryable() => {
                debug!(resource = %resource_name, attempt, error = %e, "readiness probe throttled");
            }
            Err(e) => return Err(e),
        }

        if attempt < config.max_attempts {
            debug!(
                resource = %resource_name,
                attempt,
                interval_ms = config.interval.as_millis(),
                "resource not ready, waiting"
            );
            tokio::select! {
                _ = tokio::time::sleep(config.interval) => {}
                _ = async {
                    match cancel {
                        Some(token) => token.cancelled().await,
                        None => std::future::pending().await,
                    }
                } => {
                    return Err(ProvisionError::Cancelled {
                        context: format!("wait for '{resource_name}'"),
                    });
                }
            }
        }
    }

    Err(ProvisionError::PropagationTimeout {
        resource: resource_name.to_string(),
        attempts: config.max_attempts,
    })
}
