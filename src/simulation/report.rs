use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dataset::SessionRecord;
use super::events::EventSlice;
use crate::decision::{CaseOutcome, ContentFormat, RiskOutput, RoutingDecision};
use crate::error::SimulationError;

pub const GENERATED_BY: &str = "session-risk simulate";
pub const CASE_NOTE: &str = "Synthetic example for demonstration. Not a production system.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    pub text: f64,
    pub audio: f64,
    pub visual: f64,
    pub behavior: f64,
    pub novelty: f64,
}

/// The handful of inputs shown next to each decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputsSnapshot {
    pub creator_age_band: Option<String>,
    pub creator_region: Option<String>,
    pub aud_u18_share: Option<f64>,
    pub viewer_peak: Option<u64>,
    pub cross_age_interaction_rate: f64,
    pub signals: SignalSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoCase {
    pub session_id: String,
    pub platform: Option<String>,
    pub content_format: ContentFormat,
    pub category: Option<String>,
    pub inputs_snapshot: InputsSnapshot,
    pub risk_output: RiskOutput,
    pub routing_decision: RoutingDecision,
    pub recent_event_slices: Vec<EventSlice>,
    pub notes: String,
}

impl DemoCase {
    pub fn new(
        session: &SessionRecord,
        outcome: CaseOutcome,
        recent_event_slices: Vec<EventSlice>,
    ) -> Self {
        let inputs = &session.inputs;
        DemoCase {
            session_id: session.session_id.clone(),
            platform: session.platform.clone(),
            content_format: inputs.content_format.clone(),
            category: session.category.clone(),
            inputs_snapshot: InputsSnapshot {
                creator_age_band: session.creator_age_band.clone(),
                creator_region: inputs.creator_region.clone(),
                aud_u18_share: inputs.aud_u18_share,
                viewer_peak: session.viewer_peak,
                cross_age_interaction_rate: inputs.cross_age_interaction_rate,
                signals: SignalSnapshot {
                    text: inputs.text,
                    audio: inputs.audio,
                    visual: inputs.visual,
                    behavior: inputs.behavior,
                    novelty: inputs.novelty,
                },
            },
            risk_output: outcome.risk,
            routing_decision: outcome.routing,
            recent_event_slices,
            notes: CASE_NOTE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoReport {
    pub generated_by: String,
    pub generated_at: DateTime<Utc>,
    pub run_id: Uuid,
    pub record_count: usize,
    pub cases: Vec<DemoCase>,
}

impl DemoReport {
    pub fn new(cases: Vec<DemoCase>) -> Self {
        DemoReport {
            generated_by: GENERATED_BY.to_string(),
            generated_at: Utc::now(),
            run_id: Uuid::new_v4(),
            record_count: cases.len(),
            cases,
        }
    }
}

/// Writes the report as pretty JSON, creating parent directories as needed.
pub fn write_report(path: &Path, report: &DemoReport) -> Result<(), SimulationError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| SimulationError::io(parent, e))?;
    }
    let data = serde_json::to_vec_pretty(report)?;
    fs::write(path, data).map_err(|e| SimulationError::io(path, e))?;
    info!(
        "Wrote {} demo cases to {}",
        report.record_count,
        path.display()
    );
    Ok(())
}
