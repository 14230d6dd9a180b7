//! Event time value object
//!
//! Times travel through the system as ISO-8601 strings. A value either
//! resolves to a timestamp or is carried through verbatim when it cannot be
//! interpreted, so the caller can still see what the model produced.
//! Timestamps written with a UTC offset keep it; the calendar time zone only
//! applies to wall-clock values.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Canonical wire format for resolved timestamps (`YYYY-MM-DDTHH:MM:SS`)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Naive formats accepted as a full ISO-8601 timestamp
const ISO_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Offset formats not covered by RFC 3339 (minutes precision)
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M%:z"];

/// A start or end time of a task or event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventTime {
    /// A wall-clock timestamp (the calendar applies its time zone)
    Resolved(NaiveDateTime),
    /// A timestamp with an explicit UTC offset
    Zoned(DateTime<FixedOffset>),
    /// A value that could not be interpreted, kept as received
    Unresolved(String),
}

impl EventTime {
    /// Interpret a raw string, falling back to [`EventTime::Unresolved`]
    pub fn parse(raw: &str) -> Self {
        Self::parse_timestamp(raw).unwrap_or_else(|| Self::Unresolved(raw.to_string()))
    }

    /// Parse a full ISO-8601 timestamp
    ///
    /// Accepts date-time with optional fractional seconds, a `T` or space
    /// separator, RFC 3339 offsets (kept as [`EventTime::Zoned`]) and bare
    /// dates (midnight).
    pub fn parse_timestamp(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        for format in ISO_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(Self::Resolved(dt));
            }
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self::Zoned(dt));
        }
        for format in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(raw, format) {
                return Some(Self::Zoned(dt));
            }
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(Self::Resolved)
    }

    /// The wall-clock timestamp, if resolved
    ///
    /// For zoned values this is the local time at their own offset.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Resolved(dt) => Some(*dt),
            Self::Zoned(dt) => Some(dt.naive_local()),
            Self::Unresolved(_) => None,
        }
    }

    /// The UTC offset, if the value carries one
    pub fn offset(&self) -> Option<FixedOffset> {
        match self {
            Self::Zoned(dt) => Some(*dt.offset()),
            Self::Resolved(_) | Self::Unresolved(_) => None,
        }
    }

    /// Whether the value resolved to a timestamp
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_) | Self::Zoned(_))
    }

    /// Whether the value carries no information at all
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Unresolved(raw) if raw.trim().is_empty())
    }

    /// Shift a resolved time, keeping its offset; unresolved values yield `None`
    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        match self {
            Self::Resolved(dt) => dt.checked_add_signed(duration).map(Self::Resolved),
            Self::Zoned(dt) => dt.checked_add_signed(duration).map(Self::Zoned),
            Self::Unresolved(_) => None,
        }
    }

    /// Time elapsed from `earlier` to `self`
    ///
    /// Two zoned values compare as instants; otherwise wall clocks are compared.
    pub fn signed_duration_since(&self, earlier: &Self) -> Option<Duration> {
        match (self, earlier) {
            (Self::Zoned(later), Self::Zoned(earlier)) => Some(*later - *earlier),
            _ => Some(self.as_datetime()? - earlier.as_datetime()?),
        }
    }
}

impl From<NaiveDateTime> for EventTime {
    fn from(dt: NaiveDateTime) -> Self {
        Self::Resolved(dt)
    }
}

impl From<DateTime<FixedOffset>> for EventTime {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::Zoned(dt)
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(dt) => write!(f, "{}", dt.format(TIMESTAMP_FORMAT)),
            Self::Zoned(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Self::Unresolved(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for EventTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EventTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn parses_canonical_timestamp() {
        let time = EventTime::parse("2025-07-04T10:00:00");
        assert_eq!(time, EventTime::Resolved(dt("2025-07-04T10:00:00")));
    }

    #[test]
    fn parses_minutes_precision() {
        let time = EventTime::parse("2025-07-04T10:00");
        assert_eq!(time.as_datetime(), Some(dt("2025-07-04T10:00:00")));
    }

    #[test]
    fn parses_space_separator_and_fraction() {
        let time = EventTime::parse("2025-07-04 10:00:00.250");
        let expected = dt("2025-07-04T10:00:00")
            .date()
            .and_time(NaiveTime::from_hms_milli_opt(10, 0, 0, 250).unwrap());
        assert_eq!(time.as_datetime(), Some(expected));
    }

    #[test]
    fn offsets_are_kept() {
        let tokyo = EventTime::parse("2025-07-04T10:00:00+09:00");
        assert!(matches!(tokyo, EventTime::Zoned(_)));
        assert_eq!(tokyo.offset(), FixedOffset::east_opt(9 * 3600));
        assert_eq!(tokyo.as_datetime(), Some(dt("2025-07-04T10:00:00")));
        assert_eq!(tokyo.to_string(), "2025-07-04T10:00:00+09:00");

        let utc = EventTime::parse("2025-07-04T10:00:00Z");
        assert_eq!(utc.offset(), FixedOffset::east_opt(0));
        assert_eq!(utc.to_string(), "2025-07-04T10:00:00Z");
    }

    #[test]
    fn minute_precision_offsets_are_kept() {
        let time = EventTime::parse("2025-07-04T10:00-05:00");
        assert_eq!(time.to_string(), "2025-07-04T10:00:00-05:00");
    }

    #[test]
    fn checked_add_keeps_offset() {
        let start = EventTime::parse("2025-07-04T23:30:00Z");
        let end = start.checked_add(Duration::hours(1)).unwrap();
        assert_eq!(end.to_string(), "2025-07-05T00:30:00Z");
    }

    #[test]
    fn zoned_durations_compare_instants() {
        let start = EventTime::parse("2025-07-04T10:00:00+09:00");
        let end = EventTime::parse("2025-07-04T02:00:00Z");
        assert_eq!(end.signed_duration_since(&start), Some(Duration::hours(1)));

        let wall = EventTime::parse("2025-07-04T11:00:00");
        assert_eq!(wall.signed_duration_since(&start), Some(Duration::hours(1)));
        assert!(EventTime::parse("soon").signed_duration_since(&start).is_none());
    }

    #[test]
    fn bare_date_is_midnight() {
        let time = EventTime::parse("2025-07-04");
        assert_eq!(time.as_datetime(), Some(dt("2025-07-04T00:00:00")));
    }

    #[test]
    fn partial_values_stay_unresolved() {
        assert_eq!(
            EventTime::parse("07-04T10:00:00"),
            EventTime::Unresolved("07-04T10:00:00".to_string())
        );
        assert!(!EventTime::parse("10:00:00").is_resolved());
        assert!(!EventTime::parse("next tuesday").is_resolved());
    }

    #[test]
    fn blank_detection() {
        assert!(EventTime::parse("").is_blank());
        assert!(EventTime::parse("   ").is_blank());
        assert!(!EventTime::parse("soon").is_blank());
        assert!(!EventTime::parse("2025-01-01T00:00:00").is_blank());
    }

    #[test]
    fn display_uses_canonical_format() {
        let time = EventTime::parse("2025-07-04T10:00:00.999");
        assert_eq!(time.to_string(), "2025-07-04T10:00:00");
        assert_eq!(EventTime::parse("whenever").to_string(), "whenever");
    }

    #[test]
    fn checked_add_shifts_resolved_only() {
        let start = EventTime::parse("2025-12-31T23:45:00");
        let end = start.checked_add(Duration::minutes(30)).unwrap();
        assert_eq!(end.to_string(), "2026-01-01T00:15:00");

        assert!(EventTime::parse("later").checked_add(Duration::minutes(30)).is_none());
    }

    #[test]
    fn serde_uses_plain_strings() {
        let time = EventTime::parse("2025-07-04T10:00:00");
        let json = serde_json::to_string(&time).unwrap();
        assert_eq!(json, "\"2025-07-04T10:00:00\"");

        let back: EventTime = serde_json::from_str("\"tomorrow\"").unwrap();
        assert_eq!(back, EventTime::Unresolved("tomorrow".to_string()));
    }
}
