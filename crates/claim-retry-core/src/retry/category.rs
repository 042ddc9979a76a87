//! Error categories for failed claim attempts and their static properties.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ParseError;

/// High-level classification of a failed mint/verify attempt.
///
/// Every failure message is forced into one of these buckets;
/// `UnknownError` is the fallback for anything unrecognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Gas estimation or gas limit problems.
    GasError,
    /// RPC or connectivity failure.
    NetworkError,
    /// Request or confirmation timed out.
    TimeoutError,
    /// The proof's nullifier has already been consumed. Never retried.
    NullifierReuse,
    /// Nonce too low / too high / already used.
    NonceError,
    /// Wallet cannot cover the transaction.
    BalanceError,
    /// The contract reverted the transaction.
    TransactionReverted,
    /// Anything else.
    UnknownError,
}

/// How urgently a category of failure should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// Static descriptor returned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProfile {
    pub category: ErrorCategory,
    pub priority: Priority,
    /// Whether an automatic retry can ever succeed.
    pub retryable: bool,
    /// Whether the next attempt can be tuned (gas, timeout, nonce) rather than repeated as-is.
    pub adaptable: bool,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 8] = [
        ErrorCategory::GasError,
        ErrorCategory::NetworkError,
        ErrorCategory::TimeoutError,
        ErrorCategory::NullifierReuse,
        ErrorCategory::NonceError,
        ErrorCategory::BalanceError,
        ErrorCategory::TransactionReverted,
        ErrorCategory::UnknownError,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::GasError => "gas_error",
            ErrorCategory::NetworkError => "network_error",
            ErrorCategory::TimeoutError => "timeout_error",
            ErrorCategory::NullifierReuse => "nullifier_reuse",
            ErrorCategory::NonceError => "nonce_error",
            ErrorCategory::BalanceError => "balance_error",
            ErrorCategory::TransactionReverted => "transaction_reverted",
            ErrorCategory::UnknownError => "unknown_error",
        }
    }

    /// A consumed nullifier can never be resubmitted.
    pub fn is_retryable(self) -> bool {
        !matches!(self, ErrorCategory::NullifierReuse)
    }

    pub fn profile(self) -> CategoryProfile {
        let (priority, adaptable) = match self {
            ErrorCategory::GasError => (Priority::High, true),
            ErrorCategory::NetworkError => (Priority::Medium, true),
            ErrorCategory::TimeoutError => (Priority::Medium, true),
            ErrorCategory::NullifierReuse => (Priority::Critical, false),
            ErrorCategory::NonceError => (Priority::Medium, true),
            ErrorCategory::BalanceError => (Priority::High, false),
            ErrorCategory::TransactionReverted => (Priority::High, false),
            ErrorCategory::UnknownError => (Priority::Low, false),
        };
        CategoryProfile {
            category: self,
            priority,
            retryable: self.is_retryable(),
            adaptable,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCategory {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        ErrorCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| ParseError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        };
        f.write_str(s)
    }
}
