//! Integration test: drive claims through the retry loop with scripted
//! contract-call results, under a paused tokio clock.

use std::time::Duration;

use claim_retry_core::audit::AuditDb;
use claim_retry_core::claim::{BadgeContext, BadgeTier, ClaimContext};
use claim_retry_core::predict::{QueueState, RiskHeuristics};
use claim_retry_core::retry::{
    run_claim_with_retry, BackoffSchedule, ClaimError, ErrorCategory, PerCategory, RetryPolicy,
    StopReason,
};
use claim_retry_core::service::{ClaimOutcome, RetryService};
use tempfile::tempdir;
use tokio::sync::Mutex;

fn claim(id: &str) -> ClaimContext {
    ClaimContext::new(
        id,
        BadgeContext {
            tier: BadgeTier::Rare,
            xp_earned: 300,
            token_id: 11,
            requires_proof: true,
        },
    )
}

fn queue() -> QueueState {
    QueueState {
        total_in_queue: 5,
        avg_processing_ms: 1_000,
    }
}

#[tokio::test(start_paused = true)]
async fn transient_failures_then_success() {
    let svc = Mutex::new(RetryService::default());
    let c = claim("badge-11");
    let mut script = vec![
        Err("network error: connection reset".to_string()),
        Err("network unreachable".to_string()),
        Ok(7u64),
    ]
    .into_iter();

    let started = tokio::time::Instant::now();
    let done = run_claim_with_retry(&svc, &c, &queue(), None, || {
        let next = script.next();
        async move { next.unwrap_or(Ok(0)) }
    })
    .await
    .expect("claim succeeds");

    assert_eq!(done.value, 7);
    assert_eq!(done.attempts, 3);
    let resolution = done.resolution.expect("claim had failures");
    assert_eq!(resolution.outcome, ClaimOutcome::Succeeded);
    assert_eq!(resolution.attempts, 2);

    // 120s base, then 180s, each with up to +10% jitter.
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(300), "{waited:?}");
    assert!(waited < Duration::from_secs(331), "{waited:?}");

    let svc = svc.lock().await;
    assert!(svc.get_retry_stats("badge-11").is_none());
    assert_eq!(svc.get_service_stats().retry_effectiveness, Some(1.0));
}

#[tokio::test(start_paused = true)]
async fn claims_sharing_a_service_back_off_concurrently() {
    let svc = Mutex::new(RetryService::default());
    let slow = claim("slow");
    let fast = claim("fast");
    let mut slow_script = vec![
        Err("network error".to_string()),
        Err("network unreachable".to_string()),
        Ok("slow-done"),
    ]
    .into_iter();
    let mut fast_script = vec![Err("gas too low".to_string()), Ok("fast-done")].into_iter();

    let slow_queue = queue();
    let started = tokio::time::Instant::now();
    let (slow_done, fast_done) = tokio::join!(
        run_claim_with_retry(&svc, &slow, &slow_queue, None, || {
            let next = slow_script.next();
            async move { next.unwrap_or(Ok("")) }
        }),
        async {
            let done = run_claim_with_retry(&svc, &fast, &queue(), None, || {
                let next = fast_script.next();
                async move { next.unwrap_or(Ok("")) }
            })
            .await;
            (done, started.elapsed())
        },
    );
    let total = started.elapsed();

    assert_eq!(slow_done.unwrap().value, "slow-done");
    let (fast_done, fast_elapsed) = fast_done;
    assert_eq!(fast_done.unwrap().value, "fast-done");

    // The gas claim finishes during the network claim's first backoff.
    assert!(fast_elapsed < Duration::from_secs(50), "{fast_elapsed:?}");
    // Waiting one after the other would take at least 345s.
    assert!(total < Duration::from_secs(331), "{total:?}");

    let stats = svc.lock().await.get_service_stats();
    assert_eq!(stats.resolved_claims, 2);
    assert_eq!(stats.total_claims, 0);
}

#[tokio::test(start_paused = true)]
async fn first_try_success_has_no_resolution() {
    let svc = Mutex::new(RetryService::default());
    let done = run_claim_with_retry(&svc, &claim("easy"), &queue(), None, || async {
        Ok::<_, String>("minted")
    })
    .await
    .unwrap();
    assert_eq!(done.attempts, 1);
    assert!(done.resolution.is_none());
}

#[tokio::test(start_paused = true)]
async fn nullifier_reuse_is_terminal() {
    let svc = Mutex::new(RetryService::default());
    let mut calls = 0;
    let err = run_claim_with_retry(&svc, &claim("spent"), &queue(), None, || {
        calls += 1;
        async { Err::<(), _>("XPVerifier: nullifier already used") }
    })
    .await
    .unwrap_err();

    assert!(matches!(err, ClaimError::NullifierReused { ref claim_id } if claim_id == "spent"));
    assert_eq!(calls, 1);
    assert!(svc.lock().await.get_retry_stats("spent").is_none());
}

#[tokio::test(start_paused = true)]
async fn balance_errors_need_manual_action() {
    let svc = Mutex::new(RetryService::default());
    let err = run_claim_with_retry(&svc, &claim("broke"), &queue(), None, || async {
        Err::<(), _>("insufficient balance for transfer")
    })
    .await
    .unwrap_err();

    match err {
        ClaimError::NeedsManualAction {
            category,
            attempts,
            reason,
            actions,
            ..
        } => {
            assert_eq!(category, ErrorCategory::BalanceError);
            assert_eq!(attempts, 2);
            assert_eq!(reason, StopReason::CategoryLimitReached);
            assert!(actions.iter().any(|a| a == "Add funds to wallet"), "{actions:?}");
        }
        other => panic!("expected NeedsManualAction, got {other:?}"),
    }
    let stats = svc.lock().await.get_service_stats();
    assert_eq!(stats.resolved_claims, 1);
    assert_eq!(stats.retry_effectiveness, Some(0.0));
}

#[tokio::test]
async fn audit_log_records_attempts_and_outcome() {
    let zero = PerCategory {
        gas_error: 0,
        network_error: 0,
        timeout_error: 0,
        nullifier_reuse: 0,
        nonce_error: 0,
        balance_error: 0,
        transaction_reverted: 0,
        unknown_error: 0,
    };
    let policy = RetryPolicy {
        backoff: BackoffSchedule {
            base_delays_ms: zero,
            ..BackoffSchedule::default()
        },
        ..RetryPolicy::default()
    };
    let svc = Mutex::new(RetryService::new(policy, RiskHeuristics::default()));

    let dir = tempdir().unwrap();
    let db = AuditDb::open_at(dir.path().join("audit.db")).await.unwrap();

    let mut script = vec![
        Err("nonce too low".to_string()),
        Err("replacement transaction underpriced: gas".to_string()),
        Ok(()),
    ]
    .into_iter();
    run_claim_with_retry(&svc, &claim("audited"), &queue(), Some(&db), || {
        let next = script.next();
        async move { next.unwrap_or(Ok(())) }
    })
    .await
    .unwrap();

    let rows = db.attempts_for_claim("audited").await.unwrap();
    let categories: Vec<_> = rows.iter().map(|r| r.category).collect();
    assert_eq!(categories, vec![ErrorCategory::NonceError, ErrorCategory::GasError]);
    assert_eq!(
        db.outcome_counts().await.unwrap(),
        vec![(ClaimOutcome::Succeeded, 1)]
    );
}
