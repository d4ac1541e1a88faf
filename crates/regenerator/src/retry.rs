use std::{future::Future, time::Duration};

use credregen_common::storage::credentials::CredentialRepositoryError;
use rand::Rng;
use tracing::{debug, warn};

/// Bounded exponential backoff for transient credential store failures
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (zero based): doubles each time with ±10% jitter,
    /// capped at `max_backoff`
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        let base_ms = self.initial_backoff.as_millis() as f64;
        let backoff_ms = base_ms * 2f64.powi(attempt.min(30) as i32);
        let jitter = rand::rng().random_range(0.9..=1.1);
        Duration::from_millis((backoff_ms * jitter) as u64).min(self.max_backoff)
    }
}

/// Runs `operation` until it succeeds, fails with a non-transient error, or the policy's
/// attempts are used up. The last error is returned.
pub async fn retry_transient<F, Fut, T>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, CredentialRepositoryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CredentialRepositoryError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_transient() && attempt + 1 < policy.max_attempts => {
                let backoff = policy.backoff_duration(attempt);
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "Transient credential store failure"
                );
                debug!(
                    operation = operation_name,
                    backoff_ms = backoff.as_millis() as u64,
                    "Backing off before next retry"
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
