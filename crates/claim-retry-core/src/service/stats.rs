//! Derived views over the service's attempt history.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::claim::{ClaimId, RetryAttempt};
use crate::predict::{
    category_counts, compute_trend, dominant_category, time_span_ms, RiskHeuristics, Trend,
};
use crate::retry::{ErrorCategory, ParseError};

/// Per-claim stats, computed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryStats {
    pub claim_id: ClaimId,
    pub total_attempts: u32,
    pub category_counts: BTreeMap<ErrorCategory, u32>,
    pub dominant_category: Option<ErrorCategory>,
    pub first_attempt_ms: u64,
    pub last_attempt_ms: u64,
    pub time_span_ms: u64,
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOutcome {
    Succeeded,
    Abandoned,
}

impl ClaimOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimOutcome::Succeeded => "succeeded",
            ClaimOutcome::Abandoned => "abandoned",
        }
    }

}

impl FromStr for ClaimOutcome {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "succeeded" => Ok(ClaimOutcome::Succeeded),
            "abandoned" => Ok(ClaimOutcome::Abandoned),
            _ => Err(ParseError::UnknownOutcome(s.to_string())),
        }
    }
}

/// How a retried claim ended, kept for the aggregate accuracy metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimResolution {
    pub claim_id: ClaimId,
    pub outcome: ClaimOutcome,
    pub attempts: u32,
    /// Success probability from the last analysis before resolution.
    pub last_prediction: Option<f64>,
    pub resolved_at_ms: u64,
}

/// Aggregate view across all claims the service has seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStats {
    /// Claims with live (unresolved) history.
    pub total_claims: usize,
    pub total_attempts: usize,
    pub error_distribution: BTreeMap<ErrorCategory, u32>,
    pub most_common_error: Option<ErrorCategory>,
    pub resolved_claims: usize,
    /// Share of resolved claims whose last prediction fell on the right side of 0.5.
    pub prediction_accuracy: Option<f64>,
    /// Share of resolved claims that eventually succeeded.
    pub retry_effectiveness: Option<f64>,
}

pub(super) fn retry_stats(
    claim_id: &str,
    history: &[RetryAttempt],
    heuristics: &RiskHeuristics,
) -> Option<RetryStats> {
    let first = history.first()?;
    let last = history.last()?;
    Some(RetryStats {
        claim_id: claim_id.to_string(),
        total_attempts: history.len() as u32,
        category_counts: category_counts(history),
        dominant_category: dominant_category(history),
        first_attempt_ms: first.timestamp_ms,
        last_attempt_ms: last.timestamp_ms,
        time_span_ms: time_span_ms(history),
        trend: compute_trend(history, heuristics),
    })
}

pub(super) fn service_stats(
    attempts: &HashMap<ClaimId, Vec<RetryAttempt>>,
    resolutions: &[ClaimResolution],
) -> ServiceStats {
    let mut error_distribution: BTreeMap<ErrorCategory, u32> = BTreeMap::new();
    let mut total_attempts = 0;
    for history in attempts.values() {
        total_attempts += history.len();
        for (category, n) in category_counts(history) {
            *error_distribution.entry(category).or_insert(0) += n;
        }
    }

    // Ties resolve to the category that sorts first.
    let most_common_error = error_distribution
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
        .map(|(c, _)| *c);

    let predicted: Vec<(f64, ClaimOutcome)> = resolutions
        .iter()
        .filter_map(|r| r.last_prediction.map(|p| (p, r.outcome)))
        .collect();
    let prediction_accuracy = (!predicted.is_empty()).then(|| {
        let correct = predicted
            .iter()
            .filter(|(p, outcome)| (*p >= 0.5) == (*outcome == ClaimOutcome::Succeeded))
            .count();
        correct as f64 / predicted.len() as f64
    });

    let retry_effectiveness = (!resolutions.is_empty()).then(|| {
        let succeeded = resolutions
            .iter()
            .filter(|r| r.outcome == ClaimOutcome::Succeeded)
            .count();
        succeeded as f64 / resolutions.len() as f64
    });

    ServiceStats {
        total_claims: attempts.len(),
        total_attempts,
        error_distribution,
        most_common_error,
        resolved_claims: resolutions.len(),
        prediction_accuracy,
        retry_effectiveness,
    }
}
