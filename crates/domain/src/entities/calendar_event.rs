//! Calendar event records exchanged with the calendar provider

use serde::{Deserialize, Deserializer, Serialize};

use crate::value_objects::{EventId, EventTime};

/// Request to create a calendar event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Event title/summary
    pub title: String,
    /// Start time
    pub start: EventTime,
    /// End time; the calendar client picks a default when absent
    #[serde(default, deserialize_with = "blank_as_none")]
    pub end: Option<EventTime>,
    /// Location (empty when unknown)
    #[serde(default)]
    pub location: String,
    /// Description (empty when unknown)
    #[serde(default)]
    pub description: String,
}

impl CalendarEvent {
    /// Create an event request without end, location or description
    pub fn new(title: impl Into<String>, start: EventTime) -> Self {
        Self {
            title: title.into(),
            start,
            end: None,
            location: String::new(),
            description: String::new(),
        }
    }

    /// Set the end time
    #[must_use]
    pub fn with_end(mut self, end: EventTime) -> Self {
        self.end = Some(end);
        self
    }

    /// Set the location
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<EventTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .map(|s| EventTime::parse(&s)))
}

/// An event as reported by the calendar provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Provider-assigned identifier
    pub id: EventId,
    /// Event title/summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Provider status (e.g. "confirmed")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Start time as stored by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// End time as stored by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// Location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Link to the event in the provider's UI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
}

impl EventRecord {
    /// Minimal record carrying only an identifier, summary and status
    pub fn summary_only(
        id: EventId,
        summary: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            id,
            summary: Some(summary.into()),
            status: Some(status.into()),
            start: None,
            end: None,
            location: None,
            description: None,
            html_link: None,
        }
    }
}

/// Partial update of an existing event
///
/// Fields left as `None` (or empty) keep their current provider value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start: Option<EventTime>,
    #[serde(default)]
    pub end: Option<EventTime>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl EventPatch {
    /// Whether applying this patch would change nothing
    pub fn is_empty(&self) -> bool {
        non_blank(self.title.as_deref()).is_none()
            && self.start.as_ref().is_none_or(EventTime::is_blank)
            && self.end.as_ref().is_none_or(EventTime::is_blank)
            && non_blank(self.location.as_deref()).is_none()
            && non_blank(self.description.as_deref()).is_none()
    }

    /// New title, ignoring blanks
    pub fn title(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }

    /// New location, ignoring blanks
    pub fn location(&self) -> Option<&str> {
        non_blank(self.location.as_deref())
    }

    /// New description, ignoring blanks
    pub fn description(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
