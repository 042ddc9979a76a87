//! `claim-retry delay <category> <attempt>` – preview the policy decision.

use anyhow::Result;
use claim_retry_core::config::ClaimRetryConfig;
use claim_retry_core::retry::{ErrorCategory, RetryDecision};
use claim_retry_core::service::RetryService;

pub fn run_delay(cfg: &ClaimRetryConfig, category: &str, attempt: u32) -> Result<()> {
    let category: ErrorCategory = category.parse()?;
    let svc = RetryService::from_config(cfg);

    match svc.policy().decide(category, attempt) {
        RetryDecision::NoRetry(reason) => {
            println!("{category} after {attempt} attempt(s): stop ({reason})");
        }
        RetryDecision::RetryAfter(d) => {
            println!(
                "{category} after {attempt} attempt(s): retry in {:.1}s",
                d.as_secs_f64()
            );
        }
    }
    Ok(())
}
