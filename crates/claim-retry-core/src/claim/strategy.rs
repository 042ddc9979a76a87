//! Adaptive strategy for the next attempt, derived from the failure category.

use serde::{Deserialize, Serialize};

use super::context::{BadgeContext, BadgeTier};
use crate::retry::ErrorCategory;

/// What to change (if anything) before the next attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyAction {
    IncreaseGas,
    WaitForNetwork,
    ExtendTimeout,
    Abort,
    ResyncNonce,
    RequestFunds,
    RegenerateProof,
    VerifyEligibility,
    StandardRetry,
}

/// Computed fresh from category and badge context each time; never stored on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveStrategy {
    pub action: StrategyAction,
    pub requires_user_action: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_multiplier: Option<f64>,
}

impl AdaptiveStrategy {
    fn auto(action: StrategyAction) -> Self {
        Self {
            action,
            requires_user_action: false,
            suggested_action: None,
            gas_multiplier: None,
            timeout_multiplier: None,
        }
    }

    fn user(action: StrategyAction, suggestion: &str) -> Self {
        Self {
            requires_user_action: true,
            suggested_action: Some(suggestion.to_string()),
            ..Self::auto(action)
        }
    }

    pub fn for_failure(category: ErrorCategory, badge: &BadgeContext) -> Self {
        match category {
            ErrorCategory::GasError => {
                // High-value mints get a bigger gas bump so they clear sooner.
                let bump = match badge.tier {
                    BadgeTier::Legendary | BadgeTier::Epic => 1.3,
                    BadgeTier::Rare | BadgeTier::Common => 1.2,
                };
                Self {
                    gas_multiplier: Some(bump),
                    ..Self::auto(StrategyAction::IncreaseGas)
                }
            }
            ErrorCategory::NetworkError => Self {
                timeout_multiplier: Some(1.5),
                ..Self::auto(StrategyAction::WaitForNetwork)
            },
            ErrorCategory::TimeoutError => Self {
                timeout_multiplier: Some(2.0),
                ..Self::auto(StrategyAction::ExtendTimeout)
            },
            ErrorCategory::NullifierReuse => Self::user(
                StrategyAction::Abort,
                "This badge was already claimed with this proof",
            ),
            ErrorCategory::NonceError => Self::auto(StrategyAction::ResyncNonce),
            ErrorCategory::BalanceError => {
                Self::user(StrategyAction::RequestFunds, "Add funds to wallet")
            }
            ErrorCategory::TransactionReverted if badge.requires_proof => {
                Self::auto(StrategyAction::RegenerateProof)
            }
            ErrorCategory::TransactionReverted => Self::auto(StrategyAction::VerifyEligibility),
            ErrorCategory::UnknownError => Self::auto(StrategyAction::StandardRetry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn badge(tier: BadgeTier, requires_proof: bool) -> BadgeContext {
        BadgeContext {
            tier,
            xp_earned: 100,
            token_id: 1,
            requires_proof,
        }
    }

    #[test]
    fn gas_bump_depends_on_tier() {
        let legendary = AdaptiveStrategy::for_failure(ErrorCategory::GasError, &badge(BadgeTier::Legendary, false));
        let common = AdaptiveStrategy::for_failure(ErrorCategory::GasError, &badge(BadgeTier::Common, false));
        assert_eq!(legendary.gas_multiplier, Some(1.3));
        assert_eq!(common.gas_multiplier, Some(1.2));
        assert!(!common.requires_user_action);
    }

    #[test]
    fn balance_and_nullifier_need_the_user() {
        let b = badge(BadgeTier::Rare, true);
        let balance = AdaptiveStrategy::for_failure(ErrorCategory::BalanceError, &b);
        assert!(balance.requires_user_action);
        assert_eq!(balance.suggested_action.as_deref(), Some("Add funds to wallet"));
        let nullifier = AdaptiveStrategy::for_failure(ErrorCategory::NullifierReuse, &b);
        assert_eq!(nullifier.action, StrategyAction::Abort);
        assert!(nullifier.requires_user_action);
    }

    #[test]
    fn reverted_proof_claims_regenerate_the_proof() {
        let with_proof = AdaptiveStrategy::for_failure(ErrorCategory::TransactionReverted, &badge(BadgeTier::Epic, true));
        let without = AdaptiveStrategy::for_failure(ErrorCategory::TransactionReverted, &badge(BadgeTier::Epic, false));
        assert_eq!(with_proof.action, StrategyAction::RegenerateProof);
        assert_eq!(without.action, StrategyAction::VerifyEligibility);
    }
}
