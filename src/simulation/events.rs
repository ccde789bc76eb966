use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use log::debug;
use serde_json::{Map, Number, Value};

use super::dataset::read_csv_records;
use crate::decision::{FieldValue, RawRecord};
use crate::error::SimulationError;

pub type EventSlice = Map<String, Value>;

#[derive(Debug, Clone)]
struct EventRow {
    minute_index: Option<f64>,
    slice: EventSlice,
}

/// Per-minute event rows indexed by session, each session sorted by minute.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    by_session: HashMap<String, Vec<EventRow>>,
}

impl EventLog {
    pub fn load(path: &Path) -> Result<Self, SimulationError> {
        Ok(Self::from_records(read_csv_records(path)?))
    }

    pub fn from_records(records: impl IntoIterator<Item = RawRecord>) -> Self {
        let mut by_session: HashMap<String, Vec<EventRow>> = HashMap::new();
        let mut dropped = 0usize;
        let mut unordered = 0usize;
        for record in records {
            let session_id = match record.text("session_id") {
                Ok(Some(id)) => id,
                _ => {
                    dropped += 1;
                    continue;
                }
            };
            let minute_index = match record.number("minute_index") {
                Ok(minute) => minute,
                Err(err) => {
                    debug!("Event row for {} sorts last: {}", session_id, err);
                    unordered += 1;
                    None
                }
            };
            let slice = record
                .iter()
                .map(|(key, value)| (key.to_string(), cell_to_json(value)))
                .collect();
            by_session
                .entry(session_id)
                .or_default()
                .push(EventRow { minute_index, slice });
        }
        if dropped > 0 {
            debug!("Dropped {} event rows without a session id", dropped);
        }
        if unordered > 0 {
            debug!("{} event rows have an unreadable minute_index", unordered);
        }

        // rows without a minute sort last; sort is stable otherwise
        for rows in by_session.values_mut() {
            rows.sort_by(|a, b| match (a.minute_index, b.minute_index) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }
        EventLog { by_session }
    }

    /// The latest `max_rows` slices for a session, oldest first.
    pub fn recent(&self, session_id: &str, max_rows: usize) -> Vec<EventSlice> {
        let Some(rows) = self.by_session.get(session_id) else {
            return Vec::new();
        };
        let start = rows.len().saturating_sub(max_rows);
        rows[start..].iter().map(|row| row.slice.clone()).collect()
    }

    pub fn session_count(&self) -> usize {
        self.by_session.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_session.is_empty()
    }
}

fn cell_to_json(value: Option<&FieldValue>) -> Value {
    match value {
        None | Some(FieldValue::Null) => Value::Null,
        Some(FieldValue::Flag(flag)) => Value::Bool(*flag),
        Some(FieldValue::Number(number)) => float_to_json(*number),
        Some(FieldValue::Text(raw)) => {
            let trimmed = raw.trim();
            if let Ok(integer) = trimmed.parse::<i64>() {
                Value::Number(integer.into())
            } else if let Ok(float) = trimmed.parse::<f64>() {
                float_to_json(float)
            } else {
                Value::String(raw.clone())
            }
        }
    }
}

fn float_to_json(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}
