//! Per-claim retry bookkeeping.
//!
//! `RetryService` owns, per claim id:
//! - the ordered list of failed attempts
//! - the latest failure analysis (`ClaimFailurePattern`)
//!
//! plus the resolutions of finished claims for aggregate metrics. It holds no
//! global state; each caller (or test) builds its own instance. Retries for a
//! single claim are expected to be serialised by the caller.

mod pattern;
mod stats;

use std::collections::HashMap;
use std::time::Duration;

use crate::claim::{unix_millis, ClaimContext, ClaimId, RetryAttempt};
use crate::config::ClaimRetryConfig;
use crate::predict::{self, QueueState, RetryRecommendation, RiskHeuristics, RiskLevel};
use crate::retry::{
    classify, classify_with_confidence, CategoryProfile, ErrorCategory, RetryPolicy, StopReason,
};

pub use pattern::{error_fingerprint, ClaimFailurePattern};
pub use stats::{ClaimOutcome, ClaimResolution, RetryStats, ServiceStats};

#[derive(Debug, Clone, Default)]
pub struct RetryService {
    attempts: HashMap<ClaimId, Vec<RetryAttempt>>,
    patterns: HashMap<ClaimId, ClaimFailurePattern>,
    resolutions: Vec<ClaimResolution>,
    policy: RetryPolicy,
    heuristics: RiskHeuristics,
}

impl RetryService {
    pub fn new(policy: RetryPolicy, heuristics: RiskHeuristics) -> Self {
        Self {
            policy,
            heuristics,
            ..Self::default()
        }
    }

    pub fn from_config(cfg: &ClaimRetryConfig) -> Self {
        Self::new(cfg.retry_policy(), cfg.risk_heuristics())
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn heuristics(&self) -> &RiskHeuristics {
        &self.heuristics
    }

    pub fn classify(&self, message: &str) -> CategoryProfile {
        classify(message)
    }

    pub fn should_retry(&self, category: ErrorCategory, attempt_count: u32) -> bool {
        self.policy.should_retry(category, attempt_count)
    }

    pub fn compute_delay(&self, category: ErrorCategory, attempt_count: u32) -> Duration {
        self.policy.compute_delay(category, attempt_count)
    }

    /// Backoff after `failures` failed attempts: the first retry waits the base delay.
    pub fn next_delay(&self, category: ErrorCategory, failures: u32) -> Duration {
        self.policy.next_delay(category, failures)
    }

    /// Append a failed attempt for the claim, stamped with the current time.
    pub fn track_retry_attempt(&mut self, claim: &ClaimContext, error_message: &str) -> RetryAttempt {
        self.track_retry_attempt_at(claim, error_message, unix_millis())
    }

    pub fn track_retry_attempt_at(
        &mut self,
        claim: &ClaimContext,
        error_message: &str,
        timestamp_ms: u64,
    ) -> RetryAttempt {
        let category = classify(error_message).category;
        let attempt = RetryAttempt::new(claim, error_message, category, timestamp_ms);
        self.attempts
            .entry(claim.claim_id.clone())
            .or_default()
            .push(attempt.clone());
        attempt
    }

    /// Ordered failed attempts for a claim (empty if unknown or cleared).
    pub fn attempt_history(&self, claim_id: &str) -> &[RetryAttempt] {
        self.attempts.get(claim_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn attempt_count(&self, claim_id: &str) -> u32 {
        self.attempt_history(claim_id).len() as u32
    }

    /// `None` when the claim has no recorded failures.
    pub fn get_retry_stats(&self, claim_id: &str) -> Option<RetryStats> {
        stats::retry_stats(claim_id, self.attempt_history(claim_id), &self.heuristics)
    }

    pub fn predict_success(&self, claim: &ClaimContext) -> f64 {
        predict::predict_success(claim, self.attempt_history(&claim.claim_id), &self.heuristics)
    }

    pub fn assess_risk(&self, claim_id: &str) -> RiskLevel {
        predict::assess_risk(self.attempt_history(claim_id), &self.heuristics)
    }

    pub fn generate_retry_recommendation(
        &self,
        claim: &ClaimContext,
        queue: &QueueState,
    ) -> RetryRecommendation {
        predict::generate_retry_recommendation(
            claim,
            self.attempt_history(&claim.claim_id),
            queue,
            &self.policy,
            &self.heuristics,
        )
    }

    /// Record a new failure and work out what to do next.
    pub fn analyze_failure(
        &mut self,
        claim: &ClaimContext,
        error_message: &str,
        queue: &QueueState,
    ) -> ClaimFailurePattern {
        self.analyze_failure_at(claim, error_message, queue, unix_millis())
    }

    pub fn analyze_failure_at(
        &mut self,
        claim: &ClaimContext,
        error_message: &str,
        queue: &QueueState,
        timestamp_ms: u64,
    ) -> ClaimFailurePattern {
        let classification = classify_with_confidence(error_message);
        let category = classification.profile.category;
        let error_hash = error_fingerprint(error_message);
        let repeated_error = self
            .attempt_history(&claim.claim_id)
            .iter()
            .any(|a| error_fingerprint(&a.raw_error_message) == error_hash);

        self.track_retry_attempt_at(claim, error_message, timestamp_ms);
        let attempt_count = self.attempt_count(&claim.claim_id);
        let recommendation = self.generate_retry_recommendation(claim, queue);

        let stop_reason = self
            .policy
            .stop_reason(category, attempt_count)
            .or((!recommendation.should_retry).then_some(StopReason::LowConfidence));
        let delay_ms = match stop_reason {
            None => Some(self.next_delay(category, attempt_count).as_millis() as u64),
            Some(_) => None,
        };

        match (stop_reason, delay_ms) {
            (None, Some(ms)) => tracing::info!(
                claim_id = %claim.claim_id,
                %category,
                attempt_count,
                delay_ms = ms,
                confidence = recommendation.confidence,
                "scheduling claim retry"
            ),
            (Some(reason), _) => tracing::warn!(
                claim_id = %claim.claim_id,
                %category,
                attempt_count,
                %reason,
                risk = %recommendation.risk,
                "claim retry stopped"
            ),
            _ => {}
        }

        let pattern = ClaimFailurePattern {
            claim_id: claim.claim_id.clone(),
            category,
            classification_confidence: classification.confidence,
            attempt_count,
            delay_ms,
            stop_reason,
            recommendation,
            analyzed_at_ms: timestamp_ms,
            error_hash,
            repeated_error,
        };
        self.patterns.insert(claim.claim_id.clone(), pattern.clone());
        pattern
    }

    pub fn failure_pattern(&self, claim_id: &str) -> Option<&ClaimFailurePattern> {
        self.patterns.get(claim_id)
    }

    /// Drop all history and the failure pattern for a claim.
    pub fn clear_retry_data(&mut self, claim_id: &str) {
        self.attempts.remove(claim_id);
        self.patterns.remove(claim_id);
    }

    /// The claim went through. Clears its history; returns the resolution if it
    /// had failed at least once.
    pub fn record_success(&mut self, claim_id: &str) -> Option<ClaimResolution> {
        self.resolve(claim_id, ClaimOutcome::Succeeded)
    }

    /// The claim was given up on (policy stop or user decision).
    pub fn abandon_claim(&mut self, claim_id: &str) -> Option<ClaimResolution> {
        self.resolve(claim_id, ClaimOutcome::Abandoned)
    }

    fn resolve(&mut self, claim_id: &str, outcome: ClaimOutcome) -> Option<ClaimResolution> {
        let attempts = self.attempt_count(claim_id);
        let last_prediction = self
            .patterns
            .get(claim_id)
            .map(|p| p.recommendation.confidence);
        self.clear_retry_data(claim_id);
        if attempts == 0 {
            return None;
        }
        let resolution = ClaimResolution {
            claim_id: claim_id.to_string(),
            outcome,
            attempts,
            last_prediction,
            resolved_at_ms: unix_millis(),
        };
        tracing::debug!(claim_id, ?outcome, attempts, "claim resolved");
        self.resolutions.push(resolution.clone());
        Some(resolution)
    }

    pub fn resolutions(&self) -> &[ClaimResolution] {
        &self.resolutions
    }

    pub fn get_service_stats(&self) -> ServiceStats {
        stats::service_stats(&self.attempts, &self.resolutions)
    }
}
