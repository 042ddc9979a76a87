//! Tunable weights for trend, success prediction and risk scoring.
//!
//! These are hand-tuned linear heuristics. Keeping them in one value lets the
//! config override them without touching the classifier or the scheduler.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::claim::BadgeTier;
use crate::retry::PerCategory;

/// Per-tier multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierTable {
    pub legendary: f64,
    pub epic: f64,
    pub rare: f64,
    pub common: f64,
}

impl TierTable {
    pub fn get(&self, tier: BadgeTier) -> f64 {
        match tier {
            BadgeTier::Legendary => self.legendary,
            BadgeTier::Epic => self.epic,
            BadgeTier::Rare => self.rare,
            BadgeTier::Common => self.common,
        }
    }
}

/// Risk score weights and thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub many_attempts: u32,
    pub many_attempts_weight: u32,
    pub more_attempts: u32,
    pub more_attempts_weight: u32,
    pub degrading_weight: u32,
    /// Added when the dominant category needs the user (balance, nullifier).
    pub hard_category_weight: u32,
    pub long_span_ms: u64,
    pub long_span_weight: u32,
    pub high_threshold: u32,
    pub medium_threshold: u32,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            many_attempts: 3,
            many_attempts_weight: 2,
            more_attempts: 4,
            more_attempts_weight: 2,
            degrading_weight: 3,
            hard_category_weight: 2,
            long_span_ms: 3_600_000,
            long_span_weight: 1,
            high_threshold: 6,
            medium_threshold: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskHeuristics {
    /// Success probability of the next retry, by the latest failure's category.
    pub baseline_success: PerCategory<f64>,
    /// Used when there is no history at all.
    pub empty_history_baseline: f64,
    pub severity: PerCategory<u32>,
    pub attempt_penalty: f64,
    pub max_attempt_penalty: f64,
    pub improving_bonus: f64,
    pub degrading_penalty: f64,
    pub tier_multipliers: TierTable,
    pub min_probability: f64,
    pub max_probability: f64,
    /// Size of the "recent" window when computing the trend.
    pub trend_window: usize,
    /// Mean severity difference treated as noise.
    pub trend_dead_band: f64,
    /// A recommendation only retries above this confidence.
    pub min_retry_confidence: f64,
    pub risk: RiskWeights,
}

impl Default for RiskHeuristics {
    fn default() -> Self {
        Self {
            baseline_success: PerCategory {
                gas_error: 0.85,
                network_error: 0.70,
                timeout_error: 0.75,
                nullifier_reuse: 0.05,
                nonce_error: 0.90,
                balance_error: 0.60,
                transaction_reverted: 0.65,
                unknown_error: 0.50,
            },
            empty_history_baseline: 0.75,
            severity: PerCategory {
                gas_error: 6,
                network_error: 3,
                timeout_error: 3,
                nullifier_reuse: 10,
                nonce_error: 4,
                balance_error: 8,
                transaction_reverted: 6,
                unknown_error: 5,
            },
            attempt_penalty: 0.10,
            max_attempt_penalty: 0.40,
            improving_bonus: 0.15,
            degrading_penalty: 0.20,
            tier_multipliers: TierTable {
                legendary: 1.1,
                epic: 1.05,
                rare: 1.0,
                common: 0.95,
            },
            min_probability: 0.05,
            max_probability: 0.95,
            trend_window: 3,
            trend_dead_band: 0.5,
            min_retry_confidence: 0.30,
            risk: RiskWeights::default(),
        }
    }
}

impl RiskHeuristics {
    /// Reject values that would make predictions meaningless.
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("min_probability", self.min_probability),
            ("max_probability", self.max_probability),
            ("empty_history_baseline", self.empty_history_baseline),
            ("min_retry_confidence", self.min_retry_confidence),
        ] {
            ensure!(
                v.is_finite() && (0.0..=1.0).contains(&v),
                "heuristics.{name} must be within [0, 1], got {v}"
            );
        }
        ensure!(
            self.min_probability <= self.max_probability,
            "heuristics.min_probability ({}) exceeds max_probability ({})",
            self.min_probability,
            self.max_probability
        );
        for (name, v) in [
            ("attempt_penalty", self.attempt_penalty),
            ("max_attempt_penalty", self.max_attempt_penalty),
            ("improving_bonus", self.improving_bonus),
            ("degrading_penalty", self.degrading_penalty),
            ("trend_dead_band", self.trend_dead_band),
        ] {
            ensure!(
                v.is_finite() && v >= 0.0,
                "heuristics.{name} must be finite and non-negative, got {v}"
            );
        }
        ensure!(self.trend_window > 0, "heuristics.trend_window must be at least 1");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let h: RiskHeuristics = toml::from_str(
            r#"
            improving_bonus = 0.2
            [risk]
            high_threshold = 7
            "#,
        )
        .unwrap();
        assert!((h.improving_bonus - 0.2).abs() < 1e-9);
        assert_eq!(h.risk.high_threshold, 7);
        assert_eq!(h.risk.medium_threshold, 3);
        assert_eq!(h.severity.balance_error, 8);
    }

    #[test]
    fn defaults_are_valid() {
        RiskHeuristics::default().validate().unwrap();
    }

    #[test]
    fn inverted_probability_bounds_are_rejected() {
        let h = RiskHeuristics {
            min_probability: 0.9,
            max_probability: 0.1,
            ..RiskHeuristics::default()
        };
        let err = h.validate().unwrap_err().to_string();
        assert!(err.contains("exceeds max_probability"), "{err}");
    }

    #[test]
    fn non_finite_weights_are_rejected() {
        let h = RiskHeuristics {
            degrading_penalty: f64::NAN,
            ..RiskHeuristics::default()
        };
        assert!(h.validate().is_err());
        let h = RiskHeuristics {
            max_probability: f64::INFINITY,
            ..RiskHeuristics::default()
        };
        assert!(h.validate().is_err());
    }
}
