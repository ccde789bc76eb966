use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Med,
    High,
}

impl RiskTier {
    pub const HIGH_THRESHOLD: f64 = 0.68;
    pub const MED_THRESHOLD: f64 = 0.40;

    /// Thresholds are inclusive lower bounds.
    pub fn from_score(risk_score: f64) -> Self {
        if risk_score >= Self::HIGH_THRESHOLD {
            RiskTier::High
        } else if risk_score >= Self::MED_THRESHOLD {
            RiskTier::Med
        } else {
            RiskTier::Low
        }
    }

    /// Medium and high tiers are the ones worth acting on.
    pub fn is_elevated(self) -> bool {
        !matches!(self, RiskTier::Low)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Med => "med",
            RiskTier::High => "high",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTier {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskTier::Low),
            "med" => Ok(RiskTier::Med),
            "high" => Ok(RiskTier::High),
            other => Err(format!("unknown risk tier `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    Low,
    Med,
    High,
}

impl ConfidenceBand {
    pub const HIGH_THRESHOLD: f64 = 0.72;
    pub const MED_THRESHOLD: f64 = 0.52;

    pub fn from_raw(confidence: f64) -> Self {
        if confidence >= Self::HIGH_THRESHOLD {
            ConfidenceBand::High
        } else if confidence >= Self::MED_THRESHOLD {
            ConfidenceBand::Med
        } else {
            ConfidenceBand::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceBand::Low => "low",
            ConfidenceBand::Med => "med",
            ConfidenceBand::High => "high",
        }
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suggested intervention, declared in order of increasing strength. Every
/// tier is reversible; `Prompt` is reserved and never produced by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionTier {
    None,
    Prompt,
    Friction,
    Limit,
    HumanReview,
}

impl ActionTier {
    pub fn is_reversible(self) -> bool {
        match self {
            ActionTier::None
            | ActionTier::Prompt
            | ActionTier::Friction
            | ActionTier::Limit
            | ActionTier::HumanReview => true,
        }
    }

    pub fn requires_policy_signoff(self) -> bool {
        matches!(self, ActionTier::Limit)
    }

    pub fn requires_human_review(self) -> bool {
        matches!(self, ActionTier::HumanReview)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionTier::None => "none",
            ActionTier::Prompt => "prompt",
            ActionTier::Friction => "friction",
            ActionTier::Limit => "limit",
            ActionTier::HumanReview => "human_review",
        }
    }
}

impl fmt::Display for ActionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
