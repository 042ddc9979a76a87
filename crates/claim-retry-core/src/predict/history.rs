//! Aggregates over a claim's attempt history.

use std::collections::BTreeMap;

use crate::claim::RetryAttempt;
use crate::retry::ErrorCategory;

pub fn category_counts(history: &[RetryAttempt]) -> BTreeMap<ErrorCategory, u32> {
    let mut counts = BTreeMap::new();
    for a in history {
        *counts.entry(a.category).or_insert(0) += 1;
    }
    counts
}

/// Most frequent category; ties go to the category seen most recently.
pub fn dominant_category(history: &[RetryAttempt]) -> Option<ErrorCategory> {
    let counts = category_counts(history);
    let max = counts.values().copied().max()?;
    history
        .iter()
        .rev()
        .map(|a| a.category)
        .find(|c| counts.get(c).copied() == Some(max))
}

/// Milliseconds between the first and the last attempt.
pub fn time_span_ms(history: &[RetryAttempt]) -> u64 {
    match (history.first(), history.last()) {
        (Some(first), Some(last)) => last.timestamp_ms.saturating_sub(first.timestamp_ms),
        _ => 0,
    }
}
