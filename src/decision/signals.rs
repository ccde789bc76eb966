use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DecisionError;

/// Column names understood at the record boundary.
pub mod fields {
    pub const TEXT_SIGNAL: &str = "text_signal";
    pub const AUDIO_SIGNAL: &str = "audio_signal";
    pub const VISUAL_SIGNAL: &str = "visual_signal";
    pub const BEHAVIOR_SIGNAL: &str = "behavior_signal";
    pub const NOVELTY_SCORE: &str = "novelty_score";
    pub const CROSS_AGE_INTERACTION_RATE: &str = "cross_age_interaction_rate";
    pub const AUD_U18_SHARE: &str = "aud_u18_share";
    pub const CREATOR_REGION: &str = "creator_region";
    pub const CONTENT_FORMAT: &str = "content_format";
}

/// A loosely typed cell as it arrives from a tabular or JSON source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Flag(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Blank cells and the usual null spellings carry no value.
    fn is_absent(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(raw) => {
                let trimmed = raw.trim();
                trimmed.is_empty()
                    || ["nan", "null", "none"]
                        .iter()
                        .any(|marker| trimmed.eq_ignore_ascii_case(marker))
            }
            FieldValue::Flag(_) | FieldValue::Number(_) => false,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// One untyped input record keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: impl Into<FieldValue>) {
        self.fields.insert(field.to_string(), value.into());
    }

    /// Pairs CSV headers with one row of cells. Extra cells are dropped.
    pub fn from_csv_row<'a>(
        headers: impl IntoIterator<Item = &'a str>,
        cells: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let fields = headers
            .into_iter()
            .zip(cells)
            .map(|(header, cell)| (header.trim().to_string(), FieldValue::from(cell)))
            .collect();
        RawRecord { fields }
    }

    /// Present, non-null value for `field`.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field).filter(|value| !value.is_absent())
    }

    /// Every column in key order, with absent cells normalised to `None`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&FieldValue>)> {
        self.fields.iter().map(|(key, value)| {
            let value = if value.is_absent() { None } else { Some(value) };
            (key.as_str(), value)
        })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn number(&self, field: &str) -> Result<Option<f64>, DecisionError> {
        let value = match self.get(field) {
            None => return Ok(None),
            Some(FieldValue::Number(value)) => *value,
            Some(FieldValue::Text(raw)) => raw.trim().parse::<f64>().map_err(|_| {
                DecisionError::invalid(field, format!("expected a number, got `{}`", raw.trim()))
            })?,
            Some(FieldValue::Flag(_)) => {
                return Err(DecisionError::invalid(
                    field,
                    "expected a number, got a boolean",
                ))
            }
            Some(FieldValue::Null) => return Ok(None),
        };
        if !value.is_finite() {
            return Err(DecisionError::invalid(field, "value is not finite"));
        }
        Ok(Some(value))
    }

    pub fn require_number(&self, field: &str) -> Result<f64, DecisionError> {
        self.number(field)?
            .ok_or_else(|| DecisionError::missing(field))
    }

    pub fn text(&self, field: &str) -> Result<Option<String>, DecisionError> {
        match self.get(field) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::Text(raw)) => Ok(Some(raw.trim().to_string())),
            Some(FieldValue::Number(value)) => Ok(Some(value.to_string())),
            Some(FieldValue::Flag(_)) => Err(DecisionError::invalid(
                field,
                "expected text, got a boolean",
            )),
        }
    }

    pub fn require_text(&self, field: &str) -> Result<String, DecisionError> {
        self.text(field)?
            .ok_or_else(|| DecisionError::missing(field))
    }
}

/// Delivery format of the session; only `live` changes routing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContentFormat {
    Live,
    ShortVideo,
    #[default]
    Unknown,
    Other(String),
}

impl ContentFormat {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "live" => ContentFormat::Live,
            "short_video" => ContentFormat::ShortVideo,
            "" | "unknown" => ContentFormat::Unknown,
            other => ContentFormat::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ContentFormat::Live => "live",
            ContentFormat::ShortVideo => "short_video",
            ContentFormat::Unknown => "unknown",
            ContentFormat::Other(label) => label,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, ContentFormat::Live)
    }
}

impl From<String> for ContentFormat {
    fn from(raw: String) -> Self {
        ContentFormat::parse(&raw)
    }
}

impl From<ContentFormat> for String {
    fn from(format: ContentFormat) -> Self {
        format.as_str().to_string()
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated per-session features consumed by the scorer and the router.
///
/// Signals are nominally in `[0, 1]` but are not range-checked. Non-finite
/// values are rejected by [`SignalInputs::validate`], which scoring runs first.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalInputs {
    pub text: f64,
    pub audio: f64,
    pub visual: f64,
    pub behavior: f64,
    pub novelty: f64,
    pub cross_age_interaction_rate: f64,
    pub aud_u18_share: Option<f64>,
    pub creator_region: Option<String>,
    pub content_format: ContentFormat,
}

impl SignalInputs {
    pub fn from_record(record: &RawRecord) -> Result<Self, DecisionError> {
        Ok(SignalInputs {
            text: record.require_number(fields::TEXT_SIGNAL)?,
            audio: record.require_number(fields::AUDIO_SIGNAL)?,
            visual: record.require_number(fields::VISUAL_SIGNAL)?,
            behavior: record.require_number(fields::BEHAVIOR_SIGNAL)?,
            novelty: record.require_number(fields::NOVELTY_SCORE)?,
            cross_age_interaction_rate: record
                .require_number(fields::CROSS_AGE_INTERACTION_RATE)?,
            aud_u18_share: record.number(fields::AUD_U18_SHARE)?,
            creator_region: record.text(fields::CREATOR_REGION)?,
            content_format: record
                .text(fields::CONTENT_FORMAT)?
                .map(|raw| ContentFormat::parse(&raw))
                .unwrap_or_default(),
        })
    }

    pub fn has_audience_mix(&self) -> bool {
        self.aud_u18_share.is_some()
    }

    /// Region is usable unless it is absent, empty or exactly `unknown`.
    pub fn has_known_region(&self) -> bool {
        !matches!(self.creator_region.as_deref(), None | Some("") | Some("unknown"))
    }

    /// Rejects non-finite signals. Range is not checked.
    pub fn validate(&self) -> Result<(), DecisionError> {
        let signals = [
            (fields::TEXT_SIGNAL, self.text),
            (fields::AUDIO_SIGNAL, self.audio),
            (fields::VISUAL_SIGNAL, self.visual),
            (fields::BEHAVIOR_SIGNAL, self.behavior),
            (fields::NOVELTY_SCORE, self.novelty),
            (fields::CROSS_AGE_INTERACTION_RATE, self.cross_age_interaction_rate),
        ];
        for (field, value) in signals {
            if !value.is_finite() {
                return Err(DecisionError::invalid(field, "value is not finite"));
            }
        }
        match self.aud_u18_share {
            Some(share) if !share.is_finite() => Err(DecisionError::invalid(
                fields::AUD_U18_SHARE,
                "value is not finite",
            )),
            _ => Ok(()),
        }
    }
}
