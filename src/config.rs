// src/config.rs

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

/// What the batch layer does with a record the core rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidRecordPolicy {
    /// Log and drop the record, keep going.
    #[default]
    Skip,
    /// Stop the whole run on the first bad record.
    Halt,
}

impl FromStr for InvalidRecordPolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(InvalidRecordPolicy::Skip),
            "halt" => Ok(InvalidRecordPolicy::Halt),
            other => Err(format!("expected `skip` or `halt`, got `{other}`")),
        }
    }
}

impl fmt::Display for InvalidRecordPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidRecordPolicy::Skip => f.write_str("skip"),
            InvalidRecordPolicy::Halt => f.write_str("halt"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // Inputs / outputs
    pub sessions_path: PathBuf,         // Default: ../data/synthetic_sessions.csv
    pub events_path: PathBuf,           // Default: ../data/synthetic_events.csv
    pub output_path: PathBuf,           // Default: sample_output/risk_routing_example.json

    // Demo shape
    pub demo_size: usize,               // Default: 12
    pub max_event_rows: usize,          // Default: 6
    pub seed: u64,                      // Default: 42

    // Parallelism
    pub max_parallel_cases: usize,      // Default: num_cpus::get()

    pub on_invalid: InvalidRecordPolicy, // Default: skip
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            sessions_path: PathBuf::from("../data/synthetic_sessions.csv"),
            events_path: PathBuf::from("../data/synthetic_events.csv"),
            output_path: PathBuf::from("sample_output/risk_routing_example.json"),
            demo_size: 12,
            max_event_rows: 6,
            seed: 42,
            max_parallel_cases: num_cpus::get(),
            on_invalid: InvalidRecordPolicy::Skip,
        }
    }
}

impl SimulationConfig {
    /// Reads a JSON config; omitted keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, SimulationError> {
        if !path.exists() {
            return Err(SimulationError::MissingFile(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path).map_err(|e| SimulationError::io(path, e))?;
        let config: SimulationConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.demo_size == 0 {
            return Err(SimulationError::Config("demo_size must be at least 1".into()));
        }
        if self.max_parallel_cases == 0 {
            return Err(SimulationError::Config(
                "max_parallel_cases must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
