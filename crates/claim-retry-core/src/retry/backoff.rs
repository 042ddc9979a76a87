//! Category-aware exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::category::ErrorCategory;
use super::table::PerCategory;

/// Upper bound on any computed delay: one hour.
pub const MAX_DELAY_MS: u64 = 3_600_000;

/// Base delay per category, in milliseconds.
pub const DEFAULT_BASE_DELAYS_MS: PerCategory<u64> = PerCategory {
    gas_error: 45_000,
    network_error: 120_000,
    timeout_error: 90_000,
    // Never scheduled in practice (non-retryable); same as unknown if asked.
    nullifier_reuse: 300_000,
    nonce_error: 60_000,
    balance_error: 300_000,
    transaction_reverted: 180_000,
    unknown_error: 300_000,
};

/// Exponential backoff: `min(floor(base * multiplier^n * (1 + jitter)), max_delay)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackoffSchedule {
    pub base_delays_ms: PerCategory<u64>,
    pub multiplier: f64,
    /// Jitter is drawn uniformly from `[0, max_jitter)`.
    pub max_jitter: f64,
    pub max_delay_ms: u64,
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self {
            base_delays_ms: DEFAULT_BASE_DELAYS_MS,
            multiplier: 1.5,
            max_jitter: 0.1,
            max_delay_ms: MAX_DELAY_MS,
        }
    }
}

impl BackoffSchedule {
    /// Delay before the next attempt, with a freshly drawn jitter.
    pub fn compute_delay(&self, category: ErrorCategory, attempt_count: u32) -> Duration {
        let jitter = if self.max_jitter > 0.0 && self.max_jitter.is_finite() {
            rand::rng().random_range(0.0..self.max_jitter)
        } else {
            0.0
        };
        self.compute_delay_with_jitter(category, attempt_count, jitter)
    }

    /// Delay for an explicit jitter value (clamped to `[0, max_jitter]`).
    pub fn compute_delay_with_jitter(
        &self,
        category: ErrorCategory,
        attempt_count: u32,
        jitter: f64,
    ) -> Duration {
        let base = self.base_delays_ms.get(category) as f64;
        let max_jitter = if self.max_jitter.is_finite() { self.max_jitter.max(0.0) } else { 0.0 };
        let jitter = if jitter.is_nan() { 0.0 } else { jitter.clamp(0.0, max_jitter) };
        // Past ~64 steps every sane base is already far beyond the cap.
        let exp = self.multiplier.max(1.0).powi(attempt_count.min(64) as i32);
        let raw = (base * exp * (1.0 + jitter)).floor();
        let capped = raw.min(self.max_delay_ms as f64);
        Duration::from_millis(capped as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_attempt_uses_category_base() {
        let b = BackoffSchedule::default();
        assert_eq!(
            b.compute_delay_with_jitter(ErrorCategory::GasError, 0, 0.0),
            Duration::from_millis(45_000)
        );
        assert_eq!(
            b.compute_delay_with_jitter(ErrorCategory::NetworkError, 1, 0.0),
            Duration::from_millis(180_000)
        );
    }

    #[test]
    fn grows_with_attempts_and_is_capped() {
        let b = BackoffSchedule::default();
        for c in ErrorCategory::ALL {
            let mut prev = Duration::ZERO;
            for n in 0..20 {
                let d = b.compute_delay_with_jitter(c, n, 0.0);
                assert!(d >= prev, "{c} attempt {n}");
                assert!(d <= Duration::from_millis(MAX_DELAY_MS));
                prev = d;
            }
            assert_eq!(prev, Duration::from_millis(MAX_DELAY_MS));
        }
    }

    #[test]
    fn random_jitter_stays_within_ten_percent() {
        let b = BackoffSchedule::default();
        for _ in 0..200 {
            let d = b.compute_delay(ErrorCategory::GasError, 2).as_millis() as f64;
            let floor: f64 = 45_000.0 * 1.5 * 1.5;
            assert!(d >= floor.floor());
            assert!(d < floor * 1.1);
        }
    }

    #[test]
    fn huge_attempt_counts_do_not_overflow() {
        let b = BackoffSchedule::default();
        let d = b.compute_delay(ErrorCategory::BalanceError, u32::MAX);
        assert_eq!(d, Duration::from_millis(MAX_DELAY_MS));
    }

    #[test]
    fn non_finite_jitter_is_treated_as_zero() {
        for max_jitter in [f64::INFINITY, f64::NAN, -0.5] {
            let b = BackoffSchedule {
                max_jitter,
                ..BackoffSchedule::default()
            };
            assert_eq!(
                b.compute_delay(ErrorCategory::GasError, 0),
                Duration::from_millis(45_000),
                "{max_jitter}"
            );
        }
    }

    #[test]
    fn zero_jitter_config_is_deterministic() {
        let b = BackoffSchedule {
            max_jitter: 0.0,
            ..BackoffSchedule::default()
        };
        assert_eq!(
            b.compute_delay(ErrorCategory::NonceError, 1),
            Duration::from_millis(90_000)
        );
    }
}
