//! Retry and backoff policy for badge claims.
//!
//! This module encapsulates failure classification (gas, network, nonce,
//! nullifier reuse, ...), per-category backoff and the retry limits so that
//! the claim flow and the CLI share one consistent policy.

mod backoff;
mod category;
mod classify;
mod error;
mod policy;
mod run;
mod table;

pub use backoff::{BackoffSchedule, DEFAULT_BASE_DELAYS_MS, MAX_DELAY_MS};
pub use category::{CategoryProfile, ErrorCategory, Priority};
pub use classify::{classify, classify_with_confidence, Classification, KEYWORD_TABLE};
pub use error::{ClaimError, ParseError};
pub use policy::{
    RetryDecision, RetryPolicy, StopReason, DEFAULT_ATTEMPT_LIMITS, GLOBAL_MAX_RETRIES,
};
pub use run::{run_claim_with_retry, ClaimSuccess};
pub use table::PerCategory;
