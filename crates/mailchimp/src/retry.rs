//! Bounded retry with backoff for transient remote failures.
//!
//! Rate limits honor the server's Retry-After (capped) for up to a
//! configured number of attempts; plain network failures are retried once.
//! Auth and validation failures are never retried.

use newsreport_core::ReportError;
use rand::Rng;
use std::time::Duration;

const MAX_RETRY_AFTER_SECS: u64 = 120;
const NETWORK_RETRY_DELAY_MS: u64 = 500;
const JITTER_MS: u64 = 250;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_rate_limit_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_rate_limit_retries: 3,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_rate_limit_retries: u32) -> Self {
        Self {
            max_rate_limit_retries,
        }
    }

    /// Delay before the next attempt, or None when the error must surface.
    /// `attempt` counts retries already performed for this request.
    pub fn backoff(&self, error: &ReportError, attempt: u32) -> Option<Duration> {
        match error {
            ReportError::RateLimited { retry_after_secs } if attempt < self.max_rate_limit_retries => {
                let secs = (*retry_after_secs).min(MAX_RETRY_AFTER_SECS);
                Some(Duration::from_secs(secs) + jitter())
            }
            ReportError::Network(_) if attempt < 1 => {
                Some(Duration::from_millis(NETWORK_RETRY_DELAY_MS) + jitter())
            }
            _ => None,
        }
    }
}

fn jitter() -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(0..JITTER_MS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_retried_up_to_three_times() {
        let policy = RetryPolicy::default();
        let err = ReportError::RateLimited { retry_after_secs: 10 };
        assert!(policy.backoff(&err, 0).is_some());
        assert!(policy.backoff(&err, 2).is_some());
        assert!(policy.backoff(&err, 3).is_none());
    }

    #[test]
    fn test_network_retried_once() {
        let policy = RetryPolicy::default();
        let err = ReportError::Network("connection reset".into());
        assert!(policy.backoff(&err, 0).is_some());
        assert!(policy.backoff(&err, 1).is_none());
    }

    #[test]
    fn test_auth_never_retried() {
        let policy = RetryPolicy::default();
        let err = ReportError::Auth("invalid key".into());
        assert!(policy.backoff(&err, 0).is_none());
    }

    #[test]
    fn test_retry_after_capped() {
        let policy = RetryPolicy::default();
        let err = ReportError::RateLimited { retry_after_secs: 86_400 };
        let delay = policy.backoff(&err, 0).unwrap();
        assert!(delay <= Duration::from_secs(MAX_RETRY_AFTER_SECS) + Duration::from_millis(JITTER_MS));
    }
}
