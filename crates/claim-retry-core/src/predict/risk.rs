use std::fmt;

use serde::{Deserialize, Serialize};

use super::heuristics::RiskHeuristics;
use super::history::{dominant_category, time_span_ms};
use super::trend::{compute_trend, Trend};
use crate::claim::RetryAttempt;
use crate::retry::ErrorCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        f.write_str(s)
    }
}

/// Additive risk score for a claim's history.
pub fn risk_score(history: &[RetryAttempt], heuristics: &RiskHeuristics) -> u32 {
    let w = &heuristics.risk;
    let attempts = history.len() as u32;
    let mut score = 0;

    if attempts >= w.many_attempts {
        score += w.many_attempts_weight;
    }
    if attempts >= w.more_attempts {
        score += w.more_attempts_weight;
    }
    if compute_trend(history, heuristics) == Trend::Degrading {
        score += w.degrading_weight;
    }
    if matches!(
        dominant_category(history),
        Some(ErrorCategory::BalanceError | ErrorCategory::NullifierReuse)
    ) {
        score += w.hard_category_weight;
    }
    if time_span_ms(history) > w.long_span_ms {
        score += w.long_span_weight;
    }
    score
}

/// Low / medium / high: whether to keep auto-retrying or hand the claim to the user.
pub fn assess_risk(history: &[RetryAttempt], heuristics: &RiskHeuristics) -> RiskLevel {
    let score = risk_score(history, heuristics);
    if score >= heuristics.risk.high_threshold {
        RiskLevel::High
    } else if score >= heuristics.risk.medium_threshold {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
