//! Two-stage decision pipeline: signals to risk, risk to a routing decision.
//!
//! Everything here is pure. No logging, no shared state; each call only reads
//! its arguments.

mod risk;
mod routing;
mod signals;
mod tiers;
mod weights;


use serde::{Deserialize, Serialize};

use crate::error::DecisionError;

pub use risk::{abstains, completeness_penalty, score, score_record, RiskOutput};
pub use routing::{route, RoutingBranch, RoutingContext, RoutingDecision, YOUTH_HEAVY_SHARE};
pub use signals::{fields, ContentFormat, FieldValue, RawRecord, SignalInputs};
pub use tiers::{ActionTier, ConfidenceBand, RiskTier};
pub use weights::SignalWeights;

/// Both output records for one case. Serializes as a single flat object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseOutcome {
    #[serde(flatten)]
    pub risk: RiskOutput,
    #[serde(flatten)]
    pub routing: RoutingDecision,
}

pub fn evaluate(inputs: &SignalInputs) -> Result<CaseOutcome, DecisionError> {
    let risk = score(inputs)?;
    let routing = route(&risk, inputs);
    Ok(CaseOutcome { risk, routing })
}

pub fn evaluate_record(record: &RawRecord) -> Result<CaseOutcome, DecisionError> {
    evaluate(&SignalInputs::from_record(record)?)
}
