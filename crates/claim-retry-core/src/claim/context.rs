//! Typed claim context: badge being minted and the environment it was claimed from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::retry::ParseError;

/// Claim identity (badge id / claim id). Key for every per-claim map.
pub type ClaimId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTier {
    Legendary,
    Epic,
    Rare,
    #[default]
    Common,
}

impl BadgeTier {
    pub fn as_str(self) -> &'static str {
        match self {
            BadgeTier::Legendary => "legendary",
            BadgeTier::Epic => "epic",
            BadgeTier::Rare => "rare",
            BadgeTier::Common => "common",
        }
    }

    /// Queue priority, 1 = served first.
    pub fn queue_priority(self) -> u32 {
        match self {
            BadgeTier::Legendary => 1,
            BadgeTier::Epic => 2,
            BadgeTier::Rare => 3,
            BadgeTier::Common => 4,
        }
    }
}

impl fmt::Display for BadgeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BadgeTier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legendary" => Ok(BadgeTier::Legendary),
            "epic" => Ok(BadgeTier::Epic),
            "rare" => Ok(BadgeTier::Rare),
            "common" => Ok(BadgeTier::Common),
            _ => Err(ParseError::UnknownTier(s.to_string())),
        }
    }
}

/// The badge a claim is trying to mint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BadgeContext {
    pub tier: BadgeTier,
    pub xp_earned: u64,
    pub token_id: u64,
    /// Minting needs a verified XP proof (and therefore a fresh nullifier).
    pub requires_proof: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnvironmentContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_type: Option<String>,
}

/// Everything the retry engine knows about one claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimContext {
    pub claim_id: ClaimId,
    pub badge: BadgeContext,
    #[serde(default)]
    pub environment: EnvironmentContext,
}

impl ClaimContext {
    pub fn new(claim_id: impl Into<ClaimId>, badge: BadgeContext) -> Self {
        Self {
            claim_id: claim_id.into(),
            badge,
            environment: EnvironmentContext::default(),
        }
    }

    pub fn with_environment(mut self, environment: EnvironmentContext) -> Self {
        self.environment = environment;
        self
    }
}
