use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while turning a raw record into scoreable inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionError {
    #[error("missing required field `{field}`")]
    MissingField { field: String },

    #[error("invalid value for `{field}`: {reason}")]
    InvalidInput { field: String, reason: String },
}

impl DecisionError {
    pub fn missing(field: &str) -> Self {
        DecisionError::MissingField {
            field: field.to_string(),
        }
    }

    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        DecisionError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            DecisionError::MissingField { field } => field,
            DecisionError::InvalidInput { field, .. } => field,
        }
    }
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to encode or decode json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record {row} rejected: {source}")]
    Record {
        row: usize,
        #[source]
        source: DecisionError,
    },

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SimulationError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SimulationError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_error_names_field() {
        let err = DecisionError::missing("text_signal");
        assert_eq!(err.field(), "text_signal");
        assert_eq!(err.to_string(), "missing required field `text_signal`");

        let err = DecisionError::invalid("audio_signal", "expected a number, got `loud`");
        assert_eq!(err.field(), "audio_signal");
        assert!(err.to_string().contains("`audio_signal`"));
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn record_error_wraps_decision_error() {
        let err = SimulationError::Record {
            row: 3,
            source: DecisionError::missing("novelty_score"),
        };
        assert_eq!(
            err.to_string(),
            "record 3 rejected: missing required field `novelty_score`"
        );
    }
}
