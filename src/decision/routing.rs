use serde::{Deserialize, Serialize};

use super::risk::RiskOutput;
use super::signals::SignalInputs;
use super::tiers::{ActionTier, ConfidenceBand, RiskTier};

/// Under-18 audience share at which a live session counts as youth-heavy.
pub const YOUTH_HEAVY_SHARE: f64 = 0.35;

/// Context flags the router reads from the raw inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoutingContext {
    pub youth_heavy: bool,
}

impl RoutingContext {
    pub fn from_inputs(inputs: &SignalInputs) -> Self {
        let youth_heavy = inputs.content_format.is_live()
            && inputs
                .aud_u18_share
                .map_or(false, |share| share >= YOUTH_HEAVY_SHARE);
        RoutingContext { youth_heavy }
    }
}

/// One row of the routing table. Rows are checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutingBranch {
    Abstain,
    LowRisk,
    MediumRiskYouthHeavy,
    MediumRisk,
    HighRiskHighConfidence,
    HighRiskUncertain,
}

impl RoutingBranch {
    pub fn classify(risk: &RiskOutput, context: &RoutingContext) -> Self {
        if risk.abstain_flag {
            return RoutingBranch::Abstain;
        }
        match risk.risk_tier {
            RiskTier::Low => RoutingBranch::LowRisk,
            RiskTier::Med => {
                if context.youth_heavy && risk.confidence_band != ConfidenceBand::Low {
                    RoutingBranch::MediumRiskYouthHeavy
                } else {
                    RoutingBranch::MediumRisk
                }
            }
            RiskTier::High => {
                if risk.confidence_band == ConfidenceBand::High {
                    RoutingBranch::HighRiskHighConfidence
                } else {
                    RoutingBranch::HighRiskUncertain
                }
            }
        }
    }

    pub fn action(self) -> ActionTier {
        match self {
            RoutingBranch::Abstain => ActionTier::HumanReview,
            RoutingBranch::LowRisk => ActionTier::None,
            RoutingBranch::MediumRiskYouthHeavy => ActionTier::HumanReview,
            RoutingBranch::MediumRisk => ActionTier::Friction,
            RoutingBranch::HighRiskHighConfidence => ActionTier::Limit,
            RoutingBranch::HighRiskUncertain => ActionTier::HumanReview,
        }
    }

    /// Audit text; stable per branch.
    pub fn rationale(self) -> &'static str {
        match self {
            RoutingBranch::Abstain => {
                "Low confidence with non-trivial risk → abstain from automated action and route to human review."
            }
            RoutingBranch::LowRisk => "Low risk tier → no intervention.",
            RoutingBranch::MediumRiskYouthHeavy => {
                "Medium risk + youth-heavy context → route to human review."
            }
            RoutingBranch::MediumRisk => {
                "Medium risk → apply reversible friction to reduce escalation likelihood."
            }
            RoutingBranch::HighRiskHighConfidence => {
                "High risk + high confidence → apply stronger (still reversible) limitation."
            }
            RoutingBranch::HighRiskUncertain => {
                "High risk but not high confidence → route to human review."
            }
        }
    }

    pub fn decision(self) -> RoutingDecision {
        let action = self.action();
        RoutingDecision {
            suggested_action_tier: action,
            human_review_required: action.requires_human_review(),
            rationale: self.rationale().to_string(),
            reversible: action.is_reversible(),
            requires_policy_signoff: action.requires_policy_signoff(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub suggested_action_tier: ActionTier,
    pub human_review_required: bool,
    pub rationale: String,
    pub reversible: bool,
    pub requires_policy_signoff: bool,
}

pub fn route(risk: &RiskOutput, inputs: &SignalInputs) -> RoutingDecision {
    let context = RoutingContext::from_inputs(inputs);
    RoutingBranch::classify(risk, &context).decision()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::signals::ContentFormat;

    fn live_inputs(share: Option<f64>) -> SignalInputs {
        SignalInputs {
            text: 0.5,
            audio: 0.5,
            visual: 0.5,
            behavior: 0.5,
            novelty: 0.5,
            cross_age_interaction_rate: 0.5,
            aud_u18_share: share,
            creator_region: Some("US".into()),
            content_format: ContentFormat::Live,
        }
    }

    #[test]
    fn youth_heavy_needs_live_and_share() {
        assert!(RoutingContext::from_inputs(&live_inputs(Some(0.35))).youth_heavy);
        assert!(RoutingContext::from_inputs(&live_inputs(Some(0.9))).youth_heavy);
        assert!(!RoutingContext::from_inputs(&live_inputs(Some(0.3499))).youth_heavy);
        assert!(!RoutingContext::from_inputs(&live_inputs(None)).youth_heavy);

        let mut short = live_inputs(Some(0.8));
        short.content_format = ContentFormat::ShortVideo;
        assert!(!RoutingContext::from_inputs(&short).youth_heavy);
    }

    #[test]
    fn every_branch_has_a_distinct_rationale() {
        let branches = [
            RoutingBranch::Abstain,
            RoutingBranch::LowRisk,
            RoutingBranch::MediumRiskYouthHeavy,
            RoutingBranch::MediumRisk,
            RoutingBranch::HighRiskHighConfidence,
            RoutingBranch::HighRiskUncertain,
        ];
        let mut seen = std::collections::HashSet::new();
        for branch in branches {
            assert!(seen.insert(branch.rationale()), "{branch:?}");
            let decision = branch.decision();
            assert!(decision.reversible);
            assert_eq!(decision.rationale, branch.rationale());
            assert_ne!(decision.suggested_action_tier, ActionTier::Prompt);
        }
    }
}
