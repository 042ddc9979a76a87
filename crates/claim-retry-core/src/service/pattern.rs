//! Per-claim failure analysis snapshot.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::claim::ClaimId;
use crate::predict::RetryRecommendation;
use crate::retry::{ErrorCategory, StopReason};

/// Latest analysis for a claim; overwritten on every new failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimFailurePattern {
    pub claim_id: ClaimId,
    pub category: ErrorCategory,
    pub classification_confidence: f64,
    /// Failed attempts so far, including this one.
    pub attempt_count: u32,
    /// Backoff before the next attempt; `None` when no retry should happen.
    pub delay_ms: Option<u64>,
    pub stop_reason: Option<StopReason>,
    pub recommendation: RetryRecommendation,
    pub analyzed_at_ms: u64,
    /// Fingerprint of the normalised error text.
    pub error_hash: String,
    /// The same error text was already seen earlier for this claim.
    pub repeated_error: bool,
}

impl ClaimFailurePattern {
    pub fn should_retry(&self) -> bool {
        self.stop_reason.is_none()
    }
}

/// First 16 hex chars of SHA-256 over the trimmed, lower-cased message.
pub fn error_fingerprint(message: &str) -> String {
    let normalised = message.trim().to_lowercase();
    let digest = Sha256::digest(normalised.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(16);
    hex
}
