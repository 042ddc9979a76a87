use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::backoff::BackoffSchedule;
use super::category::ErrorCategory;
use super::table::PerCategory;
use crate::config::RetryConfig;

/// Absolute cap on failed attempts per claim, across all categories.
pub const GLOBAL_MAX_RETRIES: u32 = 5;

/// Attempts allowed per category before giving up.
///
/// Transient infrastructure faults (network, timeout) get more room; faults
/// that need the user to act (balance) get very little.
pub const DEFAULT_ATTEMPT_LIMITS: PerCategory<u32> = PerCategory {
    gas_error: 3,
    network_error: 5,
    timeout_error: 4,
    nullifier_reuse: 0,
    nonce_error: 3,
    balance_error: 2,
    transaction_reverted: 4,
    unknown_error: 3,
};

/// Why the policy refused another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The category can never succeed on retry (consumed nullifier).
    NonRetryable,
    /// `global_max_retries` attempts have failed.
    GlobalCapReached,
    /// The per-category limit is spent.
    CategoryLimitReached,
    /// Policy would allow it, but the predicted outlook is too poor.
    LowConfidence,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::NonRetryable => "non-retryable",
            StopReason::GlobalCapReached => "global retry cap reached",
            StopReason::CategoryLimitReached => "category retry limit reached",
            StopReason::LowConfidence => "low predicted success",
        };
        f.write_str(s)
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry.
    NoRetry(StopReason),
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Retry policy: hard global cap, per-category limits and the backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub global_max_retries: u32,
    pub attempt_limits: PerCategory<u32>,
    pub backoff: BackoffSchedule,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            global_max_retries: GLOBAL_MAX_RETRIES,
            attempt_limits: DEFAULT_ATTEMPT_LIMITS,
            backoff: BackoffSchedule::default(),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        let defaults = BackoffSchedule::default();
        Self {
            global_max_retries: cfg.global_max_retries,
            attempt_limits: DEFAULT_ATTEMPT_LIMITS,
            backoff: BackoffSchedule {
                multiplier: cfg.backoff_multiplier,
                max_jitter: cfg.max_jitter,
                max_delay_ms: cfg.max_delay_ms,
                ..defaults
            },
        }
    }
}

impl RetryPolicy {
    /// Check the rules in order: global cap, non-retryable category, category limit.
    /// `attempt_count` is the number of attempts that have already failed.
    pub fn stop_reason(&self, category: ErrorCategory, attempt_count: u32) -> Option<StopReason> {
        if attempt_count >= self.global_max_retries {
            return Some(StopReason::GlobalCapReached);
        }
        if !category.is_retryable() {
            return Some(StopReason::NonRetryable);
        }
        if attempt_count >= self.attempt_limits.get(category) {
            return Some(StopReason::CategoryLimitReached);
        }
        None
    }

    pub fn should_retry(&self, category: ErrorCategory, attempt_count: u32) -> bool {
        self.stop_reason(category, attempt_count).is_none()
    }

    /// Raw backoff for exponent `attempt_count` (fresh jitter).
    pub fn compute_delay(&self, category: ErrorCategory, attempt_count: u32) -> Duration {
        self.backoff.compute_delay(category, attempt_count)
    }

    /// Backoff after `failures` failed attempts: the first retry waits the base delay.
    pub fn next_delay(&self, category: ErrorCategory, failures: u32) -> Duration {
        self.compute_delay(category, failures.saturating_sub(1))
    }

    /// Combine the policy check and the backoff, given `failures` failed attempts so far.
    pub fn decide(&self, category: ErrorCategory, failures: u32) -> RetryDecision {
        match self.stop_reason(category, failures) {
            Some(reason) => RetryDecision::NoRetry(reason),
            None => RetryDecision::RetryAfter(self.next_delay(category, failures)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_retryable_category_allows_a_first_retry() {
        let p = RetryPolicy::default();
        for c in ErrorCategory::ALL {
            assert_eq!(p.should_retry(c, 0), c != ErrorCategory::NullifierReuse, "{c}");
        }
    }

    #[test]
    fn global_cap_is_absolute() {
        let p = RetryPolicy::default();
        for c in ErrorCategory::ALL {
            assert!(!p.should_retry(c, GLOBAL_MAX_RETRIES), "{c}");
            assert!(!p.should_retry(c, GLOBAL_MAX_RETRIES + 10), "{c}");
        }
        assert_eq!(
            p.stop_reason(ErrorCategory::NullifierReuse, 7),
            Some(StopReason::GlobalCapReached)
        );
    }

    #[test]
    fn nullifier_reuse_never_retries() {
        let p = RetryPolicy::default();
        for n in 0..10 {
            assert!(!p.should_retry(ErrorCategory::NullifierReuse, n));
        }
        assert_eq!(
            p.decide(ErrorCategory::NullifierReuse, 0),
            RetryDecision::NoRetry(StopReason::NonRetryable)
        );
    }

    #[test]
    fn category_limits_are_exclusive() {
        let p = RetryPolicy::default();
        assert!(p.should_retry(ErrorCategory::NetworkError, 4));
        assert!(!p.should_retry(ErrorCategory::NetworkError, 5));
        assert!(p.should_retry(ErrorCategory::BalanceError, 1));
        assert_eq!(
            p.stop_reason(ErrorCategory::BalanceError, 2),
            Some(StopReason::CategoryLimitReached)
        );
        assert!(p.should_retry(ErrorCategory::GasError, 2));
        assert!(!p.should_retry(ErrorCategory::GasError, 3));
    }

    #[test]
    fn decide_returns_capped_delay() {
        let p = RetryPolicy::default();
        match p.decide(ErrorCategory::TimeoutError, 2) {
            RetryDecision::RetryAfter(d) => {
                assert!(d >= Duration::from_millis(135_000));
                assert!(d <= Duration::from_millis(p.backoff.max_delay_ms));
            }
            other => panic!("expected retry, got {other:?}"),
        }
    }

    #[test]
    fn first_retry_waits_the_base_delay() {
        let p = RetryPolicy {
            backoff: BackoffSchedule {
                max_jitter: 0.0,
                ..BackoffSchedule::default()
            },
            ..RetryPolicy::default()
        };
        assert_eq!(
            p.decide(ErrorCategory::GasError, 1),
            RetryDecision::RetryAfter(Duration::from_millis(45_000))
        );
        assert_eq!(
            p.decide(ErrorCategory::GasError, 2),
            RetryDecision::RetryAfter(Duration::from_millis(67_500))
        );
        assert_eq!(p.next_delay(ErrorCategory::GasError, 0), Duration::from_millis(45_000));
    }

    #[test]
    fn from_config_overrides_caps() {
        let cfg = RetryConfig {
            global_max_retries: 2,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
            max_jitter: 0.0,
        };
        let p = RetryPolicy::from(&cfg);
        assert!(!p.should_retry(ErrorCategory::NetworkError, 2));
        assert_eq!(
            p.compute_delay(ErrorCategory::GasError, 0),
            Duration::from_millis(10_000)
        );
    }
}
