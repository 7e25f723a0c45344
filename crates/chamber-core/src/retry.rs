//! Bounded retry of transient transport failures.
//!
//! Serial Modbus links to chamber controllers drop frames routinely, so every
//! register operation is wrapped in [`retry_transient`]: transient errors
//! (no response, invalid response) are attempted again up to the policy
//! bound, while any other error class propagates immediately.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::error::Result;

/// Defines a policy for retrying a transport operation.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    ///
    /// After this many consecutive transient failures the final error is
    /// returned to the caller.
    pub max_attempts: u32,

    /// Constant delay between attempts.
    pub backoff_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_delay: Duration::from_millis(100),
        }
    }

    pub fn with_backoff_delay(mut self, delay: Duration) -> Self {
        self.backoff_delay = delay;
        self
    }
}

impl Default for RetryPolicy {
    /// Ten attempts with a 100 ms pause, matching the register retry policy
    /// the chamber controllers have needed in practice.
    fn default() -> Self {
        Self::new(10)
    }
}

/// Runs `op`, retrying transient failures per `policy`.
///
/// Returns the first success, or the first non-transient error immediately,
/// or the final transient error once the attempt budget is exhausted.
/// `operation` names the call in retry logs.
pub async fn retry_transient<T, Fut, Op>(
    policy: &RetryPolicy,
    operation: &str,
    mut op: Op,
) -> Result<T>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                tracing::debug!(
                    operation,
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %err,
                    "transient failure, retrying"
                );
                sleep(policy.backoff_delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
