//! `claim-retry simulate` – replay failure messages for one claim.
//!
//! Each message is fed through the service as if a mint/verify call had just
//! failed with it. Stops early once the service says not to retry.

use anyhow::Result;
use clap::Args;
use claim_retry_core::audit::AuditDb;
use claim_retry_core::claim::{BadgeContext, BadgeTier, ClaimContext};
use claim_retry_core::config::ClaimRetryConfig;
use claim_retry_core::predict::QueueState;
use claim_retry_core::service::{ClaimFailurePattern, RetryService};

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Claim identifier used for the simulated history.
    #[arg(long, default_value = "sim-claim")]
    pub claim_id: String,
    /// Badge tier: common, rare, epic or legendary.
    #[arg(long, default_value = "common")]
    pub tier: String,
    #[arg(long, default_value_t = 0)]
    pub token_id: u64,
    #[arg(long, default_value_t = 0)]
    pub xp: u64,
    /// The badge mint needs a ZK proof.
    #[arg(long)]
    pub requires_proof: bool,
    /// Claims currently waiting in the processing queue.
    #[arg(long, default_value_t = 0)]
    pub queue_size: u32,
    /// Average processing time per queued claim, in seconds.
    #[arg(long, default_value_t = 30)]
    pub avg_processing_secs: u64,
    /// Print each analysis as a JSON line.
    #[arg(long)]
    pub json: bool,
    /// Failure messages, in the order they occurred.
    #[arg(required = true)]
    pub messages: Vec<String>,
}

impl SimulateArgs {
    fn claim(&self) -> Result<ClaimContext> {
        let tier: BadgeTier = self.tier.parse()?;
        Ok(ClaimContext::new(
            self.claim_id.clone(),
            BadgeContext {
                tier,
                xp_earned: self.xp,
                token_id: self.token_id,
                requires_proof: self.requires_proof,
            },
        ))
    }

    fn queue(&self) -> QueueState {
        QueueState {
            total_in_queue: self.queue_size,
            avg_processing_ms: self.avg_processing_secs.saturating_mul(1_000),
        }
    }
}

pub async fn run_simulate(cfg: &ClaimRetryConfig, args: &SimulateArgs) -> Result<()> {
    let claim = args.claim()?;
    let queue = args.queue();
    let mut svc = RetryService::from_config(cfg);

    let audit = if cfg.audit_enabled {
        match AuditDb::open_default().await {
            Ok(db) => Some(db),
            Err(e) => {
                tracing::warn!("audit log unavailable: {e:#}");
                None
            }
        }
    } else {
        None
    };

    let mut stopped = false;
    for message in &args.messages {
        let pattern = svc.analyze_failure(&claim, message, &queue);
        if let (Some(db), Some(last)) = (&audit, svc.attempt_history(&claim.claim_id).last()) {
            db.record_attempt(last).await?;
        }

        if args.json {
            println!("{}", serde_json::to_string(&pattern)?);
        } else {
            print_pattern(message, &pattern);
        }

        if !pattern.should_retry() {
            stopped = true;
            break;
        }
    }

    if let Some(stats) = svc.get_retry_stats(&claim.claim_id) {
        if args.json {
            println!("{}", serde_json::to_string(&stats)?);
        } else {
            println!(
                "claim {}: {} attempt(s), trend {}, risk {}",
                stats.claim_id,
                stats.total_attempts,
                stats.trend,
                svc.assess_risk(&claim.claim_id)
            );
        }
    }

    if stopped {
        let resolution = svc.abandon_claim(&claim.claim_id);
        if let (Some(db), Some(resolution)) = (&audit, resolution) {
            db.record_outcome(&resolution).await?;
        }
    }
    Ok(())
}

fn print_pattern(message: &str, p: &ClaimFailurePattern) {
    println!("#{} {:?}", p.attempt_count, message);
    println!(
        "  category {} ({:.2}){}",
        p.category,
        p.classification_confidence,
        if p.repeated_error { ", repeated" } else { "" }
    );
    match (p.stop_reason, p.delay_ms) {
        (Some(reason), _) => println!("  stop: {reason}"),
        (None, Some(ms)) => println!("  retry in {:.1}s", ms as f64 / 1_000.0),
        (None, None) => {}
    }
    let r = &p.recommendation;
    println!(
        "  confidence {:.2}, risk {}, queue position {}, est. wait {:.1}s",
        r.confidence,
        r.risk,
        r.queue_position,
        r.estimated_wait_ms as f64 / 1_000.0
    );
    for action in &r.alternative_actions {
        println!("  - {}", action.description);
    }
}
