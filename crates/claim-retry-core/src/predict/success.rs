use super::heuristics::RiskHeuristics;
use super::trend::{compute_trend, Trend};
use crate::claim::{ClaimContext, RetryAttempt};

/// Probability that the next retry succeeds, clamped to
/// `[min_probability, max_probability]`.
///
/// Baseline comes from the latest failure's category, then: attempt penalty,
/// trend adjustment, tier multiplier.
pub fn predict_success(
    claim: &ClaimContext,
    history: &[RetryAttempt],
    heuristics: &RiskHeuristics,
) -> f64 {
    let mut p = match history.last() {
        Some(last) => heuristics.baseline_success.get(last.category),
        None => heuristics.empty_history_baseline,
    };

    let attempts = history.len() as f64;
    p -= (attempts * heuristics.attempt_penalty).min(heuristics.max_attempt_penalty);

    match compute_trend(history, heuristics) {
        Trend::Improving => p += heuristics.improving_bonus,
        Trend::Degrading => p -= heuristics.degrading_penalty,
        Trend::Stable | Trend::InsufficientData => {}
    }

    p *= heuristics.tier_multipliers.get(claim.badge.tier);

    if p.is_nan() {
        return heuristics.min_probability;
    }
    // Not `clamp`: it panics on inverted bounds.
    p.max(heuristics.min_probability).min(heuristics.max_probability)
}
