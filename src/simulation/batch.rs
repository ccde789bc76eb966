use std::borrow::Borrow;

#[cfg(feature = "parallel-batch")]
use rayon::prelude::*;

use serde::{Deserialize, Serialize};

use super::dataset::LineInputs;
use crate::decision::{evaluate, CaseOutcome, SignalInputs};
use crate::error::{DecisionError, SimulationError};

/// One scored JSON-lines record, keyed back to its source line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLine {
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(flatten)]
    pub outcome: CaseOutcome,
}

/// Scores and routes every case. Cases are independent, so with
/// `parallel-batch` they fan out over the current Rayon pool; output order
/// always matches input order.
pub fn evaluate_batch<T>(cases: &[T]) -> Vec<Result<CaseOutcome, DecisionError>>
where
    T: Borrow<SignalInputs> + Sync,
{
    #[cfg(feature = "parallel-batch")]
    {
        cases
            .par_iter()
            .map(|case| evaluate(<T as Borrow<SignalInputs>>::borrow(case)))
            .collect()
    }
    #[cfg(not(feature = "parallel-batch"))]
    {
        cases
            .iter()
            .map(|case| evaluate(<T as Borrow<SignalInputs>>::borrow(case)))
            .collect()
    }
}

/// Same as [`evaluate_batch`], inside a dedicated pool of `max_parallel`
/// workers. The first rejected case fails the batch with its 1-based position.
pub fn evaluate_batch_bounded<T>(
    cases: &[T],
    max_parallel: usize,
) -> Result<Vec<CaseOutcome>, SimulationError>
where
    T: Borrow<SignalInputs> + Sync,
{
    #[cfg(feature = "parallel-batch")]
    let results = {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(max_parallel.max(1))
            .build()?;
        pool.install(|| evaluate_batch(cases))
    };
    #[cfg(not(feature = "parallel-batch"))]
    let results = {
        let _ = max_parallel;
        evaluate_batch(cases)
    };

    results
        .into_iter()
        .enumerate()
        .map(|(index, result)| {
            result.map_err(|source| SimulationError::Record {
                row: index + 1,
                source,
            })
        })
        .collect()
}

/// Scores JSON-lines records and tags each outcome with its source line and
/// session id, so skipped lines do not shift the output.
pub fn score_lines(
    records: &[LineInputs],
    max_parallel: usize,
) -> Result<Vec<ScoredLine>, SimulationError> {
    let inputs: Vec<&SignalInputs> = records.iter().map(|record| &record.inputs).collect();
    let outcomes = evaluate_batch_bounded(&inputs, max_parallel).map_err(|err| match err {
        // report the source line rather than the batch position
        SimulationError::Record { row, source } => SimulationError::Record {
            row: records.get(row - 1).map_or(row, |record| record.line),
            source,
        },
        other => other,
    })?;
    Ok(records
        .iter()
        .zip(outcomes)
        .map(|(record, outcome)| ScoredLine {
            line: record.line,
            session_id: record.session_id.clone(),
            outcome,
        })
        .collect())
}
