//! Retry policy for transient provider failures
//!
//! A [`RetryPolicy`] is plain configuration: how many attempts, how long to
//! wait between them, and which upstream statuses count as transient. The
//! [`RetryExecutor`] applies it around a single provider call.

use crate::providers::error::ProviderError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Delay schedule between attempts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff {
    /// Same delay before every retry
    Fixed { delay_ms: u64 },
    /// `step_ms * n` before the n-th retry
    Linear { step_ms: u64 },
    /// `initial_ms * base^(n-1)`, capped at `max_ms`
    Exponential {
        initial_ms: u64,
        base: f64,
        max_ms: u64,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Fixed { delay_ms: 500 }
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default)]
    pub backoff: Backoff,

    /// Jitter factor (0.0 to 1.0) to randomize delays
    #[serde(default)]
    pub jitter_factor: f64,

    /// Upstream HTTP statuses treated as transient
    #[serde(default = "default_retry_on_status")]
    pub retry_on_status: Vec<u16>,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_on_status() -> Vec<u16> {
    vec![503]
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff: Backoff::default(),
            jitter_factor: 0.0,
            retry_on_status: default_retry_on_status(),
        }
    }
}

impl RetryPolicy {
    /// Default policy with a custom attempt budget
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    /// A single attempt, never retried
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_retry_on_status(mut self, statuses: Vec<u16>) -> Self {
        self.retry_on_status = statuses;
        self
    }

    /// Whether an error is safe to retry under this policy
    pub fn is_transient(&self, error: &ProviderError) -> bool {
        error
            .status_code()
            .map(|status| self.retry_on_status.contains(&status))
            .unwrap_or(false)
    }

    /// Delay before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let base_ms = match &self.backoff {
            Backoff::Fixed { delay_ms } => *delay_ms as f64,
            Backoff::Linear { step_ms } => (*step_ms as f64) * retry as f64,
            Backoff::Exponential {
                initial_ms,
                base,
                max_ms,
            } => {
                let raw = *initial_ms as f64 * base.powi(retry.saturating_sub(1) as i32);
                raw.min(*max_ms as f64)
            }
        };

        let delay = if self.jitter_factor > 0.0 && base_ms > 0.0 {
            let jitter_range = base_ms * self.jitter_factor;
            let jitter = rand::thread_rng().gen_range(-jitter_range..=jitter_range);
            (base_ms + jitter).max(0.0)
        } else {
            base_ms
        };

        Duration::from_millis(delay as u64)
    }

    /// Check if attempt number `attempt` (1-based) may be followed by another
    pub fn should_retry(&self, error: &ProviderError, attempt: u32) -> bool {
        attempt < self.max_attempts && self.is_transient(error)
    }
}

/// Outcome of a retried operation
#[derive(Debug, Clone)]
pub struct RetryOutcome<T> {
    /// Final result: the first success, or the last error
    pub result: Result<T, ProviderError>,

    /// Attempts made, including the first
    pub attempts: u32,

    /// Total time spent sleeping between attempts
    pub total_delay: Duration,
}

impl<T> RetryOutcome<T> {
    pub fn into_result(self) -> Result<T, ProviderError> {
        self.result
    }
}

/// Executor for retry operations
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempt
    /// budget is spent
    pub async fn execute<F, T, Fut>(&self, mut operation: F) -> RetryOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 0;
        let mut total_delay = Duration::ZERO;

        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => {
                    return RetryOutcome {
                        result: Ok(value),
                        attempts: attempt,
                        total_delay,
                    };
                }
                Err(error) => {
                    if !self.policy.should_retry(&error, attempt) {
                        debug!(attempt, %error, "giving up");
                        return RetryOutcome {
                            result: Err(error),
                            attempts: attempt,
                            total_delay,
                        };
                    }

                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        "Attempt {} failed ({}). Retrying in {}ms...",
                        attempt,
                        error,
                        delay.as_millis()
                    );
                    total_delay += delay;
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff, Backoff::Fixed { delay_ms: 500 });
        assert_eq!(policy.retry_on_status, vec![503]);
    }

    #[test]
    fn test_backoff_schedules() {
        let fixed = RetryPolicy::default();
        assert_eq!(fixed.delay_for(1).as_millis(), 500);
        assert_eq!(fixed.delay_for(2).as_millis(), 500);

        let linear = RetryPolicy::default().with_backoff(Backoff::Linear { step_ms: 200 });
        assert_eq!(linear.delay_for(1).as_millis(), 200);
        assert_eq!(linear.delay_for(3).as_millis(), 600);

        let exponential = RetryPolicy::default().with_backoff(Backoff::Exponential {
            initial_ms: 100,
            base: 2.0,
            max_ms: 300,
        });
        assert_eq!(exponential.delay_for(1).as_millis(), 100);
        assert_eq!(exponential.delay_for(2).as_millis(), 200);
        assert_eq!(exponential.delay_for(3).as_millis(), 300);
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let policy = RetryPolicy {
            jitter_factor: 0.5,
            backoff: Backoff::Fixed { delay_ms: 1000 },
            ..Default::default()
        };
        for _ in 0..20 {
            let delay = policy.delay_for(1).as_millis();
            assert!((500..=1500).contains(&delay));
        }
    }

    #[test]
    fn test_only_listed_statuses_are_transient() {
        let policy = RetryPolicy::default();
        assert!(policy.is_transient(&ProviderError::ServiceUnavailable("busy".into())));
        assert!(!policy.is_transient(&ProviderError::Server {
            status: 500,
            message: "oops".into()
        }));
        assert!(!policy.is_transient(&ProviderError::RateLimit {
            message: "slow down".into(),
            retry_after_secs: None
        }));
        assert!(!policy.is_transient(&ProviderError::Timeout { status: None }));
        assert!(!policy.is_transient(&ProviderError::Timeout { status: Some(504) }));

        let with_gateway_timeout = RetryPolicy::default().with_retry_on_status(vec![503, 504]);
        assert!(with_gateway_timeout.is_transient(&ProviderError::Timeout { status: Some(504) }));
        assert!(!with_gateway_timeout.is_transient(&ProviderError::Timeout { status: None }));

        let wider = RetryPolicy::default().with_retry_on_status(vec![429, 503]);
        assert!(wider.is_transient(&ProviderError::RateLimit {
            message: "slow down".into(),
            retry_after_secs: None
        }));
    }

    #[test]
    fn test_should_retry_respects_budget() {
        let policy = RetryPolicy::new(2);
        let busy = ProviderError::ServiceUnavailable("busy".into());
        assert!(policy.should_retry(&busy, 1));
        assert!(!policy.should_retry(&busy, 2));
        assert!(!RetryPolicy::no_retry().should_retry(&busy, 1));
    }
}
