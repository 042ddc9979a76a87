//! Classify raw failure messages into error categories.
//!
//! Matching is a case-insensitive substring scan over an ordered keyword
//! list. The first entry that matches wins, so a message like
//! "insufficient funds for gas" is a `GasError`, not a `BalanceError`.

use super::category::{CategoryProfile, ErrorCategory};

/// Keyword precedence. Order matters.
pub const KEYWORD_TABLE: [(&str, ErrorCategory); 7] = [
    ("gas", ErrorCategory::GasError),
    ("network", ErrorCategory::NetworkError),
    ("timeout", ErrorCategory::TimeoutError),
    ("nullifier", ErrorCategory::NullifierReuse),
    ("nonce", ErrorCategory::NonceError),
    ("insufficient", ErrorCategory::BalanceError),
    ("reverted", ErrorCategory::TransactionReverted),
];

const CONFIDENCE_SINGLE_MATCH: f64 = 0.9;
const CONFIDENCE_AMBIGUOUS: f64 = 0.7;
const CONFIDENCE_FALLBACK: f64 = 0.3;

/// Classifier result with the evidence behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub profile: CategoryProfile,
    /// Every keyword found in the message, in table order.
    pub matched_keywords: Vec<&'static str>,
    pub confidence: f64,
}

/// Classify a failure message. Empty or unrecognised text is `UnknownError`.
pub fn classify(message: &str) -> CategoryProfile {
    let lower = message.to_lowercase();
    KEYWORD_TABLE
        .iter()
        .find(|(kw, _)| lower.contains(kw))
        .map(|(_, c)| *c)
        .unwrap_or(ErrorCategory::UnknownError)
        .profile()
}

/// Classify and report how clear-cut the match was.
///
/// Several matching keywords lower the confidence because table order, not
/// the message, picked the winner.
pub fn classify_with_confidence(message: &str) -> Classification {
    let lower = message.to_lowercase();
    let matched: Vec<(&'static str, ErrorCategory)> = KEYWORD_TABLE
        .iter()
        .copied()
        .filter(|(kw, _)| lower.contains(kw))
        .collect();

    let (category, confidence) = match matched.as_slice() {
        [] => (ErrorCategory::UnknownError, CONFIDENCE_FALLBACK),
        [(_, c)] => (*c, CONFIDENCE_SINGLE_MATCH),
        [(_, c), ..] => (*c, CONFIDENCE_AMBIGUOUS),
    };
    tracing::debug!(
        category = %category,
        keywords = ?matched.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
        "classified failure message"
    );

    Classification {
        profile: category.profile(),
        matched_keywords: matched.into_iter().map(|(k, _)| k).collect(),
        confidence,
    }
}
