//! Outcome prediction and risk assessment over a claim's attempt history.
//!
//! - trend: are recent failures less or more severe than earlier ones
//! - success: probability that the next retry goes through
//! - risk: low / medium / high, i.e. keep auto-retrying or ask the user
//! - recommend: all of the above plus queue state, for the claim flow

mod heuristics;
mod history;
mod recommend;
mod risk;
mod success;
mod trend;

pub use heuristics::{RiskHeuristics, RiskWeights, TierTable};
pub use history::{category_counts, dominant_category, time_span_ms};
pub use recommend::{
    estimate_queue_position, generate_retry_recommendation, ActionKind, AlternativeAction,
    QueueState, RetryRecommendation,
};
pub use risk::{assess_risk, risk_score, RiskLevel};
pub use success::predict_success;
pub use trend::{compute_trend, Trend};
