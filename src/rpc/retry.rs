//! Retry logic utilities for RPC operations
//!
//! Helpers for exponential backoff and the blocking-call timeout wrapper used
//! by [`NodeRpcClient`](crate::rpc::NodeRpcClient).

use crate::errors::{RpcError, RpcResult};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinError;
use tokio::time::error::Elapsed;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, warn};

/// Backoff parameters for retried read calls
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub backoff_multiplier: f64,
    pub max_backoff_seconds: u64,
}

/// Calculate next backoff duration using exponential backoff with a maximum cap
///
/// `new_backoff = min(current_backoff * multiplier, max_backoff)`
///
/// # Arguments
/// * `current_backoff` - Current backoff duration
/// * `multiplier` - Multiplier for exponential increase (typically 1.5-2.0)
/// * `max_backoff_seconds` - Maximum backoff duration in seconds
///
/// # Example
/// ```
/// use std::time::Duration;
/// use darinals::rpc::calculate_next_backoff;
///
/// let backoff = Duration::from_millis(100);
/// let next = calculate_next_backoff(backoff, 2.0, 10);
/// assert_eq!(next, Duration::from_millis(200));
/// ```
pub fn calculate_next_backoff(
    current_backoff: Duration,
    multiplier: f64,
    max_backoff_seconds: u64,
) -> Duration {
    Duration::from_millis((current_backoff.as_millis() as f64 * multiplier) as u64)
        .min(Duration::from_secs(max_backoff_seconds))
}

/// Execute a blocking RPC operation with timeout wrapper
///
/// # Returns
/// `Result<Result<RpcResult<T>, JoinError>, Elapsed>`
/// - Outer Result: Timeout result (Err = timeout elapsed)
/// - Middle Result: spawn_blocking result (Err = task panic/failure)
/// - Inner RpcResult<T>: RPC operation result
pub async fn execute_with_timeout<T, F>(
    timeout_seconds: u64,
    operation: F,
) -> Result<Result<RpcResult<T>, JoinError>, Elapsed>
where
    T: Send + 'static,
    F: FnOnce() -> RpcResult<T> + Send + 'static,
{
    timeout(
        Duration::from_secs(timeout_seconds),
        tokio::task::spawn_blocking(operation),
    )
    .await
}

/// Run `attempt` until it succeeds, fails with a non-retryable error or the
/// policy's attempt budget is spent
///
/// Timeouts are reported as such once the budget runs out; other transport
/// failures become [`RpcError::MaxRetriesExceeded`].
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut attempt: F,
) -> RpcResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RpcResult<T>>,
{
    let mut attempts = 0;
    let mut backoff = policy.initial_backoff;

    loop {
        match attempt().await {
            Ok(value) => {
                if attempts > 0 {
                    debug!("{} succeeded after {} attempts", operation, attempts + 1);
                }
                return Ok(value);
            }
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => {
                attempts += 1;
                if attempts >= policy.max_retries {
                    error!("{} failed after {} attempts: {}", operation, attempts, e);
                    return Err(match e {
                        RpcError::Timeout { .. } => e,
                        _ => RpcError::MaxRetriesExceeded {
                            operation: operation.to_string(),
                        },
                    });
                }

                warn!(
                    "RPC attempt {} failed for {}, retrying in {:?}: {}",
                    attempts, operation, backoff, e
                );
                sleep(backoff).await;
                backoff = calculate_next_backoff(
                    backoff,
                    policy.backoff_multiplier,
                    policy.max_backoff_seconds,
                );
            }
        }
    }
}
