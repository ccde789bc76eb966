pub mod config;
pub mod decision;
pub mod error;
pub mod simulation;

pub use config::{InvalidRecordPolicy, SimulationConfig};
pub use decision::{
    evaluate, evaluate_record, route, score, score_record, ActionTier, CaseOutcome,
    ConfidenceBand, ContentFormat, RawRecord, RiskOutput, RiskTier, RoutingDecision,
    SignalInputs,
};
pub use error::{DecisionError, SimulationError};
pub use simulation::{run_simulation, write_report, DemoReport};
