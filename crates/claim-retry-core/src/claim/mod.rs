//! Claim-side data model: badge/environment context, attempt records and
//! the adaptive strategy derived for each failure.

mod attempt;
mod context;
mod strategy;

pub use attempt::{unix_millis, RetryAttempt};
pub use context::{BadgeContext, BadgeTier, ClaimContext, ClaimId, EnvironmentContext};
pub use strategy::{AdaptiveStrategy, StrategyAction};
