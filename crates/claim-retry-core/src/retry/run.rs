//! Retry loop: run a claim attempt until success or the policy says stop.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;

use super::category::ErrorCategory;
use super::error::ClaimError;
use super::policy::StopReason;
use crate::audit::AuditDb;
use crate::claim::ClaimContext;
use crate::predict::QueueState;
use crate::service::{ClaimResolution, RetryService};

/// A claim that went through.
#[derive(Debug)]
pub struct ClaimSuccess<T> {
    pub value: T,
    /// Total attempts made, including the successful one.
    pub attempts: u32,
    /// Present when at least one attempt failed first.
    pub resolution: Option<ClaimResolution>,
}

async fn audit_outcome(audit: Option<&AuditDb>, resolution: Option<&ClaimResolution>) {
    if let (Some(db), Some(r)) = (audit, resolution) {
        if let Err(e) = db.record_outcome(r).await {
            tracing::warn!(claim_id = %r.claim_id, "failed to audit claim outcome: {e:#}");
        }
    }
}

/// Runs `attempt` until it succeeds or the retry policy says to stop.
/// On a retryable failure, sleeps for the backoff delay then tries again.
///
/// The service lock is only held while recording a result, never across an
/// attempt or a backoff sleep, so several claims can share one service.
/// The caller owns cancellation: dropping the returned future abandons the
/// claim between attempts. Audit failures are logged, never fatal.
pub async fn run_claim_with_retry<T, E, F, Fut>(
    service: &Mutex<RetryService>,
    claim: &ClaimContext,
    queue: &QueueState,
    audit: Option<&AuditDb>,
    mut attempt: F,
) -> Result<ClaimSuccess<T>, ClaimError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let claim_id = claim.claim_id.as_str();
    let mut tries = 0u32;
    loop {
        tries += 1;
        let err = match attempt().await {
            Ok(value) => {
                let resolution = service.lock().await.record_success(claim_id);
                audit_outcome(audit, resolution.as_ref()).await;
                return Ok(ClaimSuccess {
                    value,
                    attempts: tries,
                    resolution,
                });
            }
            Err(e) => e,
        };

        let message = err.to_string();
        let (pattern, recorded) = {
            let mut svc = service.lock().await;
            let pattern = svc.analyze_failure(claim, &message, queue);
            let recorded = svc.attempt_history(claim_id).last().cloned();
            (pattern, recorded)
        };
        if let (Some(db), Some(last)) = (audit, recorded.as_ref()) {
            if let Err(e) = db.record_attempt(last).await {
                tracing::warn!(claim_id, "failed to audit retry attempt: {e:#}");
            }
        }

        match (pattern.stop_reason, pattern.delay_ms) {
            (None, delay_ms) => {
                tokio::time::sleep(Duration::from_millis(delay_ms.unwrap_or(0))).await;
            }
            (Some(reason), _) => {
                let resolution = service.lock().await.abandon_claim(claim_id);
                audit_outcome(audit, resolution.as_ref()).await;
                if pattern.category == ErrorCategory::NullifierReuse {
                    return Err(ClaimError::NullifierReused {
                        claim_id: claim_id.to_string(),
                    });
                }
                return Err(ClaimError::NeedsManualAction {
                    claim_id: claim_id.to_string(),
                    category: pattern.category,
                    attempts: pattern.attempt_count,
                    reason,
                    actions: manual_actions(&pattern.recommendation.alternative_actions, reason),
                });
            }
        }
    }
}

fn manual_actions(
    suggested: &[crate::predict::AlternativeAction],
    reason: StopReason,
) -> Vec<String> {
    let mut actions: Vec<String> = suggested.iter().map(|a| a.description.clone()).collect();
    if actions.is_empty() && reason != StopReason::NonRetryable {
        actions.push("Retry the claim manually later".to_string());
    }
    actions
}
