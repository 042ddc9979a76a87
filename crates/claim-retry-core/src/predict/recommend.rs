//! Compose prediction, risk and queue state into a retry recommendation.

use serde::{Deserialize, Serialize};

use super::heuristics::RiskHeuristics;
use super::history::dominant_category;
use super::risk::{assess_risk, RiskLevel};
use super::success::predict_success;
use crate::claim::{ClaimContext, RetryAttempt};
use crate::retry::{ErrorCategory, RetryPolicy};

/// Snapshot reported by the backend retry queue. Input only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueueState {
    pub total_in_queue: u32,
    pub avg_processing_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Only the user can fix this (fund the wallet, contact support).
    UserAction,
    /// The client can apply this before the next attempt.
    AutoFix,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeAction {
    pub kind: ActionKind,
    pub description: String,
}

impl AlternativeAction {
    fn user(description: &str) -> Self {
        Self {
            kind: ActionKind::UserAction,
            description: description.to_string(),
        }
    }

    fn auto(description: &str) -> Self {
        Self {
            kind: ActionKind::AutoFix,
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryRecommendation {
    pub should_retry: bool,
    /// Predicted success probability of the next retry.
    pub confidence: f64,
    pub estimated_wait_ms: u64,
    pub queue_position: u32,
    pub alternative_actions: Vec<AlternativeAction>,
    pub risk: RiskLevel,
}

fn actions_for(category: ErrorCategory) -> Option<AlternativeAction> {
    match category {
        ErrorCategory::BalanceError => Some(AlternativeAction::user("Add funds to wallet")),
        ErrorCategory::NullifierReuse => Some(AlternativeAction::user(
            "This badge was already claimed; contact support",
        )),
        ErrorCategory::GasError => Some(AlternativeAction::auto("Increase gas limit by 20%")),
        ErrorCategory::NonceError => Some(AlternativeAction::auto("Reset wallet nonce and resubmit")),
        _ => None,
    }
}

/// Queue slot estimate: tier priority plus two slots per failed attempt,
/// never past the end of the queue.
pub fn estimate_queue_position(claim: &ClaimContext, attempts: u32, queue: &QueueState) -> u32 {
    let raw = claim
        .badge
        .tier
        .queue_priority()
        .saturating_add(attempts.saturating_mul(2));
    raw.min(queue.total_in_queue.max(1))
}

pub fn generate_retry_recommendation(
    claim: &ClaimContext,
    history: &[RetryAttempt],
    queue: &QueueState,
    policy: &RetryPolicy,
    heuristics: &RiskHeuristics,
) -> RetryRecommendation {
    let attempts = history.len() as u32;
    let confidence = predict_success(claim, history, heuristics);
    let risk = assess_risk(history, heuristics);
    let latest = history.last().map(|a| a.category);

    let retryable = latest.map_or(true, ErrorCategory::is_retryable);
    let should_retry = confidence > heuristics.min_retry_confidence
        && attempts < policy.global_max_retries
        && retryable;

    let queue_position = estimate_queue_position(claim, attempts, queue);
    let backoff_ms = latest
        .map(|c| {
            policy
                .backoff
                .compute_delay_with_jitter(c, attempts.saturating_sub(1), 0.0)
                .as_millis() as u64
        })
        .unwrap_or(0);
    let estimated_wait_ms = backoff_ms
        .saturating_add(u64::from(queue_position).saturating_mul(queue.avg_processing_ms));

    let mut alternative_actions = Vec::new();
    for category in [dominant_category(history), latest].into_iter().flatten() {
        if let Some(action) = actions_for(category) {
            if !alternative_actions.contains(&action) {
                alternative_actions.push(action);
            }
        }
    }
    if risk == RiskLevel::High {
        alternative_actions.push(AlternativeAction::user("Retry manually later"));
    }

    RetryRecommendation {
        should_retry,
        confidence,
        estimated_wait_ms,
        queue_position,
        alternative_actions,
        risk,
    }
}
