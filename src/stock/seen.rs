//! Rendering of upstream `seen` timestamps in the reference time zone.

use std::fmt::Display;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

/// All timestamps handed to clients are shown in US Eastern, regardless of where we run.
pub const REFERENCE_TZ: Tz = chrono_tz::America::New_York;

const DISPLAY_FORMAT: &str = "%m/%d/%Y, %I:%M:%S %p";

/// ISO-8601 forms outside RFC 3339: minute precision, compact or hour-only offsets.
const OFFSET_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
];

/// Offset-less inputs are interpreted as UTC.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// The outcome of reading a single sighting's timestamp.
#[derive(Debug, Clone, PartialEq)]
pub enum SeenAt {
    At(DateTime<Tz>),
    Missing,
    Invalid(String),
}

impl SeenAt {
    pub fn from_value(value: Option<&serde_json::Value>) -> Self {
        match value {
            None | Some(serde_json::Value::Null) => Self::Missing,
            Some(serde_json::Value::String(raw)) => Self::parse(raw),
            Some(other) => Self::Invalid(other.to_string()),
        }
    }

    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::Missing;
        }

        match parse_utc(raw) {
            Some(utc) => Self::At(utc.with_timezone(&REFERENCE_TZ)),
            None => Self::Invalid(raw.to_string()),
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}

fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    // A trailing `Z` is the same as a zero offset
    let with_offset = match raw.strip_suffix(['Z', 'z']) {
        Some(stripped) => format!("{stripped}+00:00"),
        None => raw.to_string(),
    };
    let offset = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(&with_offset, format).ok());
    if let Some(parsed) = offset {
        return Some(parsed.with_timezone(&Utc));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    Some(Utc.from_utc_datetime(&naive))
}

/// Formats an instant the same way sightings are shown.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&REFERENCE_TZ)
        .format(DISPLAY_FORMAT)
        .to_string()
}

impl Display for SeenAt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::At(at) => write!(f, "{}", at.format(DISPLAY_FORMAT)),
            Self::Missing => write!(f, "N/A"),
            Self::Invalid(_) => write!(f, "Invalid date"),
        }
    }
}

impl Serialize for SeenAt {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winter_time() {
        let seen = SeenAt::parse("2024-01-01T00:00:00Z");
        assert_eq!(seen.to_string(), "12/31/2023, 07:00:00 PM");
    }

    #[test]
    fn summer_time() {
        let seen = SeenAt::parse("2024-07-01T16:00:00.000Z");
        assert_eq!(seen.to_string(), "07/01/2024, 12:00:00 PM");
    }

    #[test]
    fn explicit_offset() {
        let seen = SeenAt::parse("2024-01-01T02:30:15+02:00");
        assert_eq!(seen.to_string(), "12/31/2023, 07:30:15 PM");
    }

    #[test]
    fn naive_is_utc() {
        let seen = SeenAt::parse("2024-01-01T00:00:00");
        assert_eq!(seen.to_string(), "12/31/2023, 07:00:00 PM");
    }

    #[test]
    fn minute_precision_with_z() {
        let seen = SeenAt::parse("2024-01-01T00:00Z");
        assert_eq!(seen.to_string(), "12/31/2023, 07:00:00 PM");
    }

    #[test]
    fn compact_offset() {
        let seen = SeenAt::parse("2024-01-01T00:00:00+0000");
        assert_eq!(seen.to_string(), "12/31/2023, 07:00:00 PM");
    }

    #[test]
    fn hour_only_offset() {
        let seen = SeenAt::parse("2024-01-01T05:00:00.5+05");
        assert_eq!(seen.to_string(), "12/31/2023, 07:00:00 PM");

        let seen = SeenAt::parse("2024-01-01T05:00+05");
        assert_eq!(seen.to_string(), "12/31/2023, 07:00:00 PM");
    }

    #[test]
    fn naive_minute_precision() {
        let seen = SeenAt::parse("2024-01-01T00:00");
        assert_eq!(seen.to_string(), "12/31/2023, 07:00:00 PM");

        let seen = SeenAt::parse("2024-01-01 00:00");
        assert_eq!(seen.to_string(), "12/31/2023, 07:00:00 PM");
    }

    #[test]
    fn date_only_is_midnight_utc() {
        let seen = SeenAt::parse("2024-01-01");
        assert_eq!(seen.to_string(), "12/31/2023, 07:00:00 PM");
    }

    #[test]
    fn missing() {
        assert_eq!(SeenAt::parse(""), SeenAt::Missing);
        assert_eq!(SeenAt::from_value(None), SeenAt::Missing);
        assert_eq!(
            SeenAt::from_value(Some(&serde_json::Value::Null)),
            SeenAt::Missing
        );
        assert_eq!(SeenAt::Missing.to_string(), "N/A");
    }

    #[test]
    fn invalid() {
        let seen = SeenAt::parse("not-a-date");
        assert!(seen.is_invalid());
        assert_eq!(seen.to_string(), "Invalid date");

        let seen = SeenAt::from_value(Some(&serde_json::json!(1704067200)));
        assert_eq!(seen.to_string(), "Invalid date");
    }

    #[test]
    fn serializes_as_string() {
        let rendered = serde_json::to_string(&SeenAt::parse("2024-01-01T00:00:00Z")).unwrap();
        assert_eq!(rendered, "\"12/31/2023, 07:00:00 PM\"");
    }

    #[test]
    fn instant_label() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 15, 4, 5, 6).unwrap();
        assert_eq!(format_instant(instant), "03/15/2024, 12:05:06 AM");
    }
}
