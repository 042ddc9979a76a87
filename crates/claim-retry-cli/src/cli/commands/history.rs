//! `claim-retry history <claim-id>` – list audited attempts for a claim.

use anyhow::Result;
use claim_retry_core::audit::AuditDb;

pub async fn run_history(claim_id: &str) -> Result<()> {
    let db = AuditDb::open_default().await?;
    let rows = db.attempts_for_claim(claim_id).await?;
    if rows.is_empty() {
        println!("No attempts recorded for claim {claim_id}.");
        return Ok(());
    }
    println!(
        "{:<15} {:<22} {:<20} {:<18} {}",
        "TIMESTAMP_MS", "CATEGORY", "ACTION", "HASH", "MESSAGE"
    );
    for r in rows {
        println!(
            "{:<15} {:<22} {:<20} {:<18} {}",
            r.timestamp_ms, r.category, r.strategy_action, r.error_hash, r.error_message
        );
    }
    Ok(())
}
