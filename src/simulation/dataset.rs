use std::io::BufRead;
use std::path::Path;

use log::{debug, warn};

use crate::config::InvalidRecordPolicy;
use crate::decision::{RawRecord, RiskTier, SignalInputs};
use crate::error::{DecisionError, SimulationError};

/// One row of the sessions table: metadata for the report plus scoreable inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub session_id: String,
    pub platform: Option<String>,
    pub category: Option<String>,
    pub creator_age_band: Option<String>,
    pub viewer_peak: Option<u64>,
    pub raw_report_count: u64,
    /// Tier label shipped with the dataset, used only for demo selection.
    pub labeled_tier: Option<RiskTier>,
    pub inputs: SignalInputs,
}

impl SessionRecord {
    pub fn from_record(record: &RawRecord) -> Result<Self, DecisionError> {
        let labeled_tier = record
            .text("risk_tier")?
            .map(|raw| {
                raw.parse::<RiskTier>()
                    .map_err(|reason| DecisionError::invalid("risk_tier", reason))
            })
            .transpose()?;

        Ok(SessionRecord {
            session_id: record.require_text("session_id")?,
            platform: record.text("platform")?,
            category: record.text("category")?,
            creator_age_band: record.text("creator_age_band")?,
            viewer_peak: count(record, "viewer_peak")?,
            raw_report_count: count(record, "raw_report_count")?.unwrap_or(0),
            labeled_tier,
            inputs: SignalInputs::from_record(record)?,
        })
    }
}

fn count(record: &RawRecord, field: &str) -> Result<Option<u64>, DecisionError> {
    match record.number(field)? {
        None => Ok(None),
        Some(value) if value >= 0.0 && value.fract() == 0.0 => Ok(Some(value as u64)),
        Some(value) => Err(DecisionError::invalid(
            field,
            format!("expected a non-negative whole number, got {value}"),
        )),
    }
}

/// Reads a headed CSV file into raw records, one per row.
pub fn read_csv_records(path: &Path) -> Result<Vec<RawRecord>, SimulationError> {
    if !path.exists() {
        return Err(SimulationError::MissingFile(path.to_path_buf()));
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(RawRecord::from_csv_row(headers.iter(), row.iter()));
    }
    debug!("Read {} rows from {}", records.len(), path.display());
    Ok(records)
}

/// Applies `parse` to every record, honouring the invalid-record policy.
/// Row numbers in errors and logs are 1-based.
pub(crate) fn collect_valid<T>(
    records: impl IntoIterator<Item = RawRecord>,
    policy: InvalidRecordPolicy,
    parse: impl Fn(&RawRecord) -> Result<T, DecisionError>,
) -> Result<Vec<T>, SimulationError> {
    let mut parsed = Vec::new();
    for (index, record) in records.into_iter().enumerate() {
        let row = index + 1;
        match parse(&record) {
            Ok(value) => parsed.push(value),
            Err(source) => match policy {
                InvalidRecordPolicy::Skip => {
                    warn!("Skipping record {}: {}", row, source);
                }
                InvalidRecordPolicy::Halt => {
                    return Err(SimulationError::Record { row, source });
                }
            },
        }
    }
    Ok(parsed)
}

pub fn load_sessions(
    path: &Path,
    policy: InvalidRecordPolicy,
) -> Result<Vec<SessionRecord>, SimulationError> {
    let records = read_csv_records(path)?;
    let total = records.len();
    let sessions = collect_valid(records, policy, SessionRecord::from_record)?;
    if sessions.len() < total {
        warn!(
            "Loaded {} of {} sessions from {}",
            sessions.len(),
            total,
            path.display()
        );
    }
    Ok(sessions)
}

/// A JSON-lines record that parsed cleanly, tagged with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LineInputs {
    /// 1-based line in the source stream.
    pub line: usize,
    pub session_id: Option<String>,
    pub inputs: SignalInputs,
}

impl LineInputs {
    fn from_record(line: usize, record: &RawRecord) -> Result<Self, DecisionError> {
        Ok(LineInputs {
            line,
            session_id: record.text("session_id")?,
            inputs: SignalInputs::from_record(record)?,
        })
    }
}

/// Reads JSON-lines input records. Blank lines are ignored; a line that is not
/// a JSON object counts as an invalid record.
pub fn read_json_records(
    reader: impl BufRead,
    policy: InvalidRecordPolicy,
) -> Result<Vec<LineInputs>, SimulationError> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| SimulationError::io("<input>", e))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<RawRecord>(&line) {
            Ok(record) => records.push((index + 1, record)),
            Err(err) => match policy {
                InvalidRecordPolicy::Skip => warn!("Skipping line {}: {}", index + 1, err),
                InvalidRecordPolicy::Halt => return Err(err.into()),
            },
        }
    }

    let mut inputs = Vec::with_capacity(records.len());
    for (line, record) in records {
        match LineInputs::from_record(line, &record) {
            Ok(parsed) => inputs.push(parsed),
            Err(source) => match policy {
                InvalidRecordPolicy::Skip => warn!("Skipping line {}: {}", line, source),
                InvalidRecordPolicy::Halt => {
                    return Err(SimulationError::Record { row: line, source })
                }
            },
        }
    }
    Ok(inputs)
}
