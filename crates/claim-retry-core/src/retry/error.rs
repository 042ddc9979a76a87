//! Terminal claim outcomes and parse errors.

use thiserror::Error;

use super::category::ErrorCategory;
use super::policy::StopReason;

/// Returned by the retry loop when a claim cannot be completed automatically.
///
/// Neither variant is a system fault: both are expected terminations that the
/// caller surfaces to the user.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// The proof's nullifier was already consumed; the claim can never succeed.
    #[error("claim {claim_id}: nullifier already used, badge cannot be claimed again")]
    NullifierReused { claim_id: String },

    /// The retry budget is spent or the outlook is too poor to keep retrying.
    #[error("claim {claim_id}: needs manual action after {attempts} attempt(s) ({category}, {reason})")]
    NeedsManualAction {
        claim_id: String,
        category: ErrorCategory,
        attempts: u32,
        reason: StopReason,
        /// Suggested next steps for the user.
        actions: Vec<String>,
    },
}

/// Failed to parse a category, tier or outcome name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown error category: {0}")]
    UnknownCategory(String),
    #[error("unknown badge tier: {0}")]
    UnknownTier(String),
    #[error("unknown claim outcome: {0}")]
    UnknownOutcome(String),
}
