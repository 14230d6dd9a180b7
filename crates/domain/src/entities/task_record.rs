//! Task record - the normalized result of extracting a task from free text

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::{entities::CalendarEvent, value_objects::EventTime};

/// A task extracted from natural-language text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Short task title
    pub title: String,
    /// Start time
    pub start: EventTime,
    /// End time
    pub end: EventTime,
    /// Location (empty when unknown)
    #[serde(default)]
    pub location: String,
    /// Free-form description (empty when unknown)
    #[serde(default)]
    pub description: String,
}

impl TaskRecord {
    /// Create a task without location or description
    pub fn new(title: impl Into<String>, start: EventTime, end: EventTime) -> Self {
        Self {
            title: title.into(),
            start,
            end,
            location: String::new(),
            description: String::new(),
        }
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

    /// Span between start and end when both are resolved
    pub fn duration(&self) -> Option<Duration> {
        self.end.signed_duration_since(&self.start)
    }

    /// Turn the task into a calendar event creation request
    pub fn into_calendar_event(self) -> CalendarEvent {
        CalendarEvent {
            title: self.title,
            start: self.start,
            end: Some(self.end),
            location: self.location,
            description: self.description,
        }
    }
}
