mod batch;
mod dataset;
mod events;
mod report;
mod selection;

use log::info;

use crate::config::SimulationConfig;
use crate::decision::SignalInputs;
use crate::error::SimulationError;

pub use batch::{evaluate_batch, evaluate_batch_bounded, score_lines, ScoredLine};
pub use dataset::{
    load_sessions, read_csv_records, read_json_records, LineInputs, SessionRecord,
};
pub use events::{EventLog, EventSlice};
pub use report::{
    write_report, DemoCase, DemoReport, InputsSnapshot, SignalSnapshot, CASE_NOTE, GENERATED_BY,
};
pub use selection::select_demo_sessions;

/// Loads both datasets, picks the demo sessions, runs the decision pipeline
/// over them and assembles the report. Writing it out is left to the caller.
pub fn run_simulation(config: &SimulationConfig) -> Result<DemoReport, SimulationError> {
    config.validate()?;

    let sessions = load_sessions(&config.sessions_path, config.on_invalid)?;
    let events = EventLog::load(&config.events_path)?;
    info!(
        "Loaded {} sessions and events for {} sessions",
        sessions.len(),
        events.session_count()
    );

    let demo = select_demo_sessions(&sessions, config.demo_size, config.seed);
    let inputs: Vec<&SignalInputs> = demo.iter().map(|session| &session.inputs).collect();
    let outcomes = evaluate_batch_bounded(&inputs, config.max_parallel_cases)?;

    let cases: Vec<DemoCase> = demo
        .iter()
        .zip(outcomes)
        .map(|(session, outcome)| {
            let recent = events.recent(&session.session_id, config.max_event_rows);
            DemoCase::new(session, outcome, recent)
        })
        .collect();

    let review_count = cases
        .iter()
        .filter(|case| case.routing_decision.human_review_required)
        .count();
    info!(
        "Evaluated {} demo cases, {} routed to human review",
        cases.len(),
        review_count
    );

    Ok(DemoReport::new(cases))
}
