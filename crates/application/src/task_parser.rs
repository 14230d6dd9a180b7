//! Task parsing pipeline
//!
//! Turns raw model output into a normalized [`TaskRecord`]:
//!
//! 1. [`parse_model_output`] decodes the JSON object, first strictly and then by
//!    recovering the first `{ ... }` span embedded in surrounding prose.
//! 2. [`build_task`] repairs missing fields and normalizes the times.
//!
//! The extracted task always lasts [`EXTRACTED_TASK_DURATION_MINUTES`],
//! whatever end time the model proposed.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use domain::{EventTime, TIMESTAMP_FORMAT, TaskRecord};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::error::ApplicationError;

/// Title used when the model did not produce one
pub const UNTITLED_TASK_TITLE: &str = "untitled task";

/// Year assumed when the model omits it
pub const DEFAULT_YEAR: i32 = 2025;

/// Length of an extracted task
pub const EXTRACTED_TASK_DURATION_MINUTES: i64 = 30;

/// JSON object decoded from model output
pub type TaskFields = Map<String, Value>;

/// Why model output could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("no JSON object found in model output")]
    NoJsonObject,

    #[error("embedded JSON is invalid: {0}")]
    MalformedJson(String),

    #[error("model output is JSON but not an object")]
    NotAnObject,
}

impl From<ParseFailure> for ApplicationError {
    fn from(failure: ParseFailure) -> Self {
        Self::Parse(failure.to_string())
    }
}

/// Result of decoding model output
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// The whole output was a JSON object
    Strict(TaskFields),
    /// A JSON object was recovered from inside the output
    Recovered(TaskFields),
    /// Nothing usable
    Failed(ParseFailure),
}

impl ParseOutcome {
    /// Collapse into the decoded fields or the failure
    pub fn into_result(self) -> Result<TaskFields, ParseFailure> {
        match self {
            Self::Strict(fields) | Self::Recovered(fields) => Ok(fields),
            Self::Failed(failure) => Err(failure),
        }
    }

    pub const fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered(_))
    }
}

/// Stage 1: the output must be a JSON document as a whole
///
/// Returns `None` when the output is not JSON at all, so the next stage can
/// try; a JSON value that is not an object is a definite failure.
pub fn parse_strict(raw: &str) -> Option<Result<TaskFields, ParseFailure>> {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(Value::Object(fields)) => Some(Ok(fields)),
        Ok(_) => Some(Err(ParseFailure::NotAnObject)),
        Err(_) => None,
    }
}

/// Stage 2: drop line breaks and decode the span from the first `{` to the last `}`
pub fn parse_embedded(raw: &str) -> Result<TaskFields, ParseFailure> {
    let flattened: String = raw.chars().filter(|c| !matches!(c, '\n' | '\r')).collect();

    let (Some(open), Some(close)) = (flattened.find('{'), flattened.rfind('}')) else {
        return Err(ParseFailure::NoJsonObject);
    };
    if close < open {
        return Err(ParseFailure::NoJsonObject);
    }

    match serde_json::from_str::<Value>(&flattened[open..=close]) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(ParseFailure::NotAnObject),
        Err(e) => Err(ParseFailure::MalformedJson(e.to_string())),
    }
}

/// Decode model output into JSON fields
pub fn parse_model_output(raw: &str) -> ParseOutcome {
    match parse_strict(raw) {
        Some(Ok(fields)) => ParseOutcome::Strict(fields),
        Some(Err(failure)) => ParseOutcome::Failed(failure),
        None => match parse_embedded(raw) {
            Ok(fields) => {
                debug!("Recovered JSON object embedded in model output");
                ParseOutcome::Recovered(fields)
            },
            Err(failure) => ParseOutcome::Failed(failure),
        },
    }
}

/// Normalize a time produced by the model
///
/// Full ISO-8601 timestamps are kept, including any UTC offset. Otherwise `MM-DDTHH:MM:SS` gets
/// [`DEFAULT_YEAR`], and a bare `HH:MM:SS` lands on January 1st of that
/// year. Anything else is carried through unchanged.
pub fn normalize_time(raw: &str) -> EventTime {
    let trimmed = raw.trim();

    if let Some(time) = EventTime::parse_timestamp(trimmed) {
        return time;
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(&format!("{DEFAULT_YEAR}-{trimmed}"), TIMESTAMP_FORMAT) {
        debug!(raw = %raw, "Completed time with default year");
        return EventTime::Resolved(dt);
    }

    if let Some(dt) = NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .ok()
        .zip(NaiveDate::from_ymd_opt(DEFAULT_YEAR, 1, 1))
        .map(|(time, date)| date.and_time(time))
    {
        debug!(raw = %raw, "Placed bare time on default date");
        return EventTime::Resolved(dt);
    }

    EventTime::Unresolved(raw.to_string())
}

/// Text content of a field, `None` when missing, null, false or blank
fn text_field(fields: &TaskFields, key: &str) -> Option<String> {
    let text = match fields.get(key)? {
        Value::Null | Value::Bool(false) => return None,
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// Repair and normalize decoded fields into a task
///
/// `now` stands in for a missing start time.
pub fn build_task(fields: &TaskFields, now: NaiveDateTime) -> Result<TaskRecord, ApplicationError> {
    let duration = Duration::minutes(EXTRACTED_TASK_DURATION_MINUTES);

    let title = text_field(fields, "title").unwrap_or_else(|| UNTITLED_TASK_TITLE.to_string());
    let start = text_field(fields, "start")
        .map_or(EventTime::Resolved(now), |raw| normalize_time(&raw));
    let proposed_end = text_field(fields, "end").map(|raw| normalize_time(&raw));

    let end = match (start.checked_add(duration), proposed_end) {
        (Some(end), _) => end,
        // Start could not be interpreted; keep what the model said
        (None, Some(end)) => end,
        (None, None) => {
            return Err(ApplicationError::Parse(format!(
                "start time '{start}' is not a valid timestamp"
            )));
        },
    };

    Ok(TaskRecord::new(title, start, end)
        .with_location(text_field(fields, "location").unwrap_or_default())
        .with_description(text_field(fields, "description").unwrap_or_default()))
}
