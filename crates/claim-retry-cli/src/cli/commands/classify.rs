//! `claim-retry classify <message>` – show the category a failure maps to.

use anyhow::Result;
use claim_retry_core::claim::{AdaptiveStrategy, BadgeContext};
use claim_retry_core::retry::classify_with_confidence;

pub fn run_classify(message: &str, json: bool) -> Result<()> {
    let c = classify_with_confidence(message);
    let strategy = AdaptiveStrategy::for_failure(c.profile.category, &BadgeContext::default());

    if json {
        let out = serde_json::json!({
            "profile": c.profile,
            "matched_keywords": c.matched_keywords,
            "confidence": c.confidence,
            "strategy": strategy,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("category:    {}", c.profile.category);
    println!("priority:    {}", c.profile.priority);
    println!("retryable:   {}", c.profile.retryable);
    println!("adaptable:   {}", c.profile.adaptable);
    println!("confidence:  {:.2}", c.confidence);
    if !c.matched_keywords.is_empty() {
        println!("keywords:    {}", c.matched_keywords.join(", "));
    }
    if let Some(s) = &strategy.suggested_action {
        println!("suggestion:  {}", s);
    }
    Ok(())
}
