use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::context::{BadgeContext, ClaimContext, ClaimId, EnvironmentContext};
use super::strategy::AdaptiveStrategy;
use crate::retry::ErrorCategory;

/// One failed attempt for a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryAttempt {
    pub claim_id: ClaimId,
    /// Unix milliseconds.
    pub timestamp_ms: u64,
    pub raw_error_message: String,
    pub category: ErrorCategory,
    pub strategy: AdaptiveStrategy,
    pub badge: BadgeContext,
    pub environment: EnvironmentContext,
}

impl RetryAttempt {
    /// Build an attempt record for an already classified failure.
    pub fn new(
        claim: &ClaimContext,
        raw_error_message: &str,
        category: ErrorCategory,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            claim_id: claim.claim_id.clone(),
            timestamp_ms,
            raw_error_message: raw_error_message.to_string(),
            category,
            strategy: AdaptiveStrategy::for_failure(category, &claim.badge),
            badge: claim.badge.clone(),
            environment: claim.environment.clone(),
        }
    }
}

/// Current time as Unix milliseconds.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
