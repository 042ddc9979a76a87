//! `claim-retry report` – aggregate view of the audit log.

use anyhow::Result;
use claim_retry_core::audit::AuditDb;

pub async fn run_report() -> Result<()> {
    let db = AuditDb::open_default().await?;

    let categories = db.category_counts().await?;
    let total: i64 = categories.iter().map(|(_, n)| n).sum();
    println!("Attempts by category ({total} total):");
    if categories.is_empty() {
        println!("  (none)");
    }
    for (category, n) in &categories {
        let share = if total > 0 { *n as f64 / total as f64 * 100.0 } else { 0.0 };
        println!("  {:<22} {:>6}  {:>5.1}%", category, n, share);
    }

    let outcomes = db.outcome_counts().await?;
    println!("Claim outcomes:");
    if outcomes.is_empty() {
        println!("  (none)");
    }
    for (outcome, n) in outcomes {
        println!("  {:<22} {:>6}", outcome.as_str(), n);
    }
    Ok(())
}
