//! Date conversions and the legacy event shape.
//!
//! Google Calendar exchanges instants as RFC 3339 strings and all-day dates
//! as `YYYY-MM-DD`. Callers hand us epoch milliseconds, ISO strings or
//! already-parsed datetimes; everything is normalized to UTC and rendered
//! with millisecond precision (`2024-03-15T10:00:00.000Z`).

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::options::is_truthy;

/// Errors produced by date conversions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The text could not be parsed as a date or datetime.
    #[error("invalid date: {0:?}")]
    InvalidDate(String),

    /// The epoch milliseconds fall outside the representable range.
    #[error("timestamp out of range: {0}")]
    OutOfRange(i64),

    /// The JSON value is neither a number nor a string.
    #[error("unsupported date value: {0}")]
    Unsupported(String),
}

/// A loosely typed date argument.
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    /// ISO-8601 / RFC 3339 text, or a bare `YYYY-MM-DD` date.
    Text(String),
    /// An already parsed instant.
    DateTime(DateTime<Utc>),
}

impl From<i64> for DateInput {
    fn from(millis: i64) -> Self {
        Self::Millis(millis)
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for DateInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}

impl TryFrom<&Value> for DateInput {
    type Error = ConversionError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
                .map(Self::Millis)
                .ok_or_else(|| ConversionError::Unsupported(n.to_string())),
            other => Err(ConversionError::Unsupported(other.to_string())),
        }
    }
}

impl DateInput {
    /// Resolves the input to a UTC instant.
    ///
    /// Text without an offset is read as UTC. A bare date resolves to
    /// midnight UTC.
    pub fn to_utc(&self) -> Result<DateTime<Utc>, ConversionError> {
        match self {
            Self::DateTime(dt) => Ok(*dt),
            Self::Millis(ms) => Utc
                .timestamp_millis_opt(*ms)
                .single()
                .ok_or(ConversionError::OutOfRange(*ms)),
            Self::Text(text) => parse_text(text),
        }
    }
}

fn parse_text(text: &str) -> Result<DateTime<Utc>, ConversionError> {
    let trimmed = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ConversionError::InvalidDate(text.to_string()))
}

/// Renders a date input the way Google expects datetimes.
pub fn to_google_date_time(value: impl Into<DateInput>) -> Result<String, ConversionError> {
    let dt = value.into().to_utc()?;
    Ok(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Renders a date input as a Google all-day date (`YYYY-MM-DD`).
pub fn to_google_date(value: impl Into<DateInput>) -> Result<String, ConversionError> {
    let dt = value.into().to_utc()?;
    Ok(dt.format("%Y-%m-%d").to_string())
}

/// Parses a Google datetime string into a UTC instant.
pub fn from_google_date_time(value: &str) -> Result<DateTime<Utc>, ConversionError> {
    parse_text(value)
}

/// Parses a Google date (or datetime) string into its UTC calendar date.
pub fn from_google_date(value: &str) -> Result<NaiveDate, ConversionError> {
    parse_text(value).map(|dt| dt.date_naive())
}

/// An event in the shape used by the legacy calendar API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,
    /// The Google event this was converted from.
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub all_day_event: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl LegacyEvent {
    /// Serializes the event to JSON.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// One side (start or end) of a legacy event.
struct LegacyBoundary {
    instant: String,
    date: String,
    all_day: bool,
}

fn legacy_boundary(side: &Value) -> Option<LegacyBoundary> {
    if let Some(date) = truthy_str(side, "date") {
        return Some(LegacyBoundary {
            instant: format!("{}T00:00:00.000Z", date),
            date: date.to_string(),
            all_day: true,
        });
    }
    truthy_str(side, "dateTime").map(|dt| LegacyBoundary {
        instant: dt.to_string(),
        date: dt.chars().take(10).collect(),
        all_day: false,
    })
}

fn truthy_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .filter(|v| is_truthy(v))
        .and_then(Value::as_str)
}

/// Converts a Google event into the legacy event shape.
///
/// Returns `None` when there is no event to convert.
pub fn convert_event(event: &Value) -> Option<LegacyEvent> {
    if !is_truthy(event) {
        return None;
    }

    let mut legacy = LegacyEvent {
        event_id: event.get("id").and_then(Value::as_str).map(str::to_string),
        calendar_id: truthy_str(event, "calendarId").map(str::to_string),
        data: event.clone(),
        cancelled: event.get("status").and_then(Value::as_str) == Some("cancelled"),
        summary: event
            .get("summary")
            .and_then(Value::as_str)
            .map(str::to_string),
        ..LegacyEvent::default()
    };

    if let Some(start) = event.get("start").filter(|v| is_truthy(v)) {
        if let Some(boundary) = legacy_boundary(start) {
            legacy.all_day_event |= boundary.all_day;
            legacy.start = Some(boundary.instant);
            legacy.start_date = Some(boundary.date);
        }
        if let Some(tz) = truthy_str(start, "timeZone") {
            legacy.timezone = Some(tz.to_string());
        }
    }

    if let Some(end) = event.get("end").filter(|v| is_truthy(v)) {
        if let Some(boundary) = legacy_boundary(end) {
            legacy.all_day_event |= boundary.all_day;
            legacy.end = Some(boundary.instant);
            legacy.end_date = Some(boundary.date);
        }
        if let Some(tz) = truthy_str(end, "timeZone") {
            legacy.timezone = Some(tz.to_string());
        }
    }

    Some(legacy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn millis_to_google_date_time() {
        assert_eq!(
            to_google_date_time(1_710_496_800_000_i64).unwrap(),
            "2024-03-15T10:00:00.000Z"
        );
        assert_eq!(to_google_date(1_710_496_800_000_i64).unwrap(), "2024-03-15");
    }

    #[test]
    fn text_with_offset_is_normalized_to_utc() {
        assert_eq!(
            to_google_date_time("2024-03-15T10:00:00-03:00").unwrap(),
            "2024-03-15T13:00:00.000Z"
        );
        assert_eq!(
            to_google_date("2024-03-15T23:30:00-03:00").unwrap(),
            "2024-03-16"
        );
    }

    #[test]
    fn bare_date_is_midnight_utc() {
        assert_eq!(
            to_google_date_time("2024-03-15").unwrap(),
            "2024-03-15T00:00:00.000Z"
        );
    }

    #[test]
    fn naive_datetime_is_read_as_utc() {
        assert_eq!(
            to_google_date_time("2024-03-15T08:15:30.250").unwrap(),
            "2024-03-15T08:15:30.250Z"
        );
    }

    #[test]
    fn datetime_input_passes_through() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(to_google_date_time(dt).unwrap(), "2024-01-02T03:04:05.000Z");
    }

    #[test]
    fn invalid_text_is_rejected() {
        assert_eq!(
            to_google_date_time("next tuesday"),
            Err(ConversionError::InvalidDate("next tuesday".to_string()))
        );
        assert!(from_google_date("2024-13-40").is_err());
    }

    #[test]
    fn json_values_convert() {
        let input = DateInput::try_from(&json!(0)).unwrap();
        assert_eq!(to_google_date_time(input).unwrap(), "1970-01-01T00:00:00.000Z");
        assert!(DateInput::try_from(&json!(true)).is_err());
    }

    #[test]
    fn from_google_values() {
        let dt = from_google_date_time("2024-03-15T10:00:00.000Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap());
        assert_eq!(
            from_google_date("2024-03-15T10:00:00+02:00").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
        assert_eq!(
            from_google_date("2024-03-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }

    #[test]
    fn missing_event_converts_to_nothing() {
        assert!(convert_event(&Value::Null).is_none());
        assert!(convert_event(&json!(false)).is_none());
    }

    #[test]
    fn timed_event_conversion() {
        let event = json!({
            "id": "evt-2",
            "calendarId": "work@example.com",
            "status": "confirmed",
            "summary": "Standup",
            "start": {"dateTime": "2024-03-15T10:00:00-03:00", "timeZone": "America/Sao_Paulo"},
            "end": {"dateTime": "2024-03-15T10:15:00-03:00"}
        });
        let legacy = convert_event(&event).unwrap();
        assert_eq!(legacy.event_id.as_deref(), Some("evt-2"));
        assert_eq!(legacy.calendar_id.as_deref(), Some("work@example.com"));
        assert!(!legacy.cancelled);
        assert!(!legacy.all_day_event);
        assert_eq!(legacy.start.as_deref(), Some("2024-03-15T10:00:00-03:00"));
        assert_eq!(legacy.start_date.as_deref(), Some("2024-03-15"));
        assert_eq!(legacy.end_date.as_deref(), Some("2024-03-15"));
        assert_eq!(legacy.timezone.as_deref(), Some("America/Sao_Paulo"));
        assert_eq!(legacy.data, event);
    }

    #[test]
    fn end_timezone_wins() {
        let event = json!({
            "start": {"dateTime": "2024-03-15T10:00:00Z", "timeZone": "UTC"},
            "end": {"dateTime": "2024-03-15T11:00:00Z", "timeZone": "Europe/Paris"}
        });
        let legacy = convert_event(&event).unwrap();
        assert_eq!(legacy.timezone.as_deref(), Some("Europe/Paris"));
    }

    #[test]
    fn event_id_is_copied_as_is() {
        let legacy = convert_event(&json!({"id": "", "summary": "Draft"})).unwrap();
        assert_eq!(legacy.event_id.as_deref(), Some(""));
        assert_eq!(legacy.to_value()["eventId"], json!(""));
    }

    #[test]
    fn cancelled_event_keeps_flag() {
        let legacy = convert_event(&json!({"id": "gone", "status": "cancelled"})).unwrap();
        assert!(legacy.cancelled);
        assert!(legacy.start.is_none());
        assert!(legacy.end.is_none());
    }

    #[test]
    fn all_day_event_snapshot() {
        let event = json!({
            "calendarId": "primary",
            "end": {"date": "2024-03-16"},
            "id": "evt-1",
            "start": {"date": "2024-03-15"},
            "summary": "Offsite"
        });
        let legacy = convert_event(&event).unwrap();
        insta::assert_json_snapshot!(legacy, @r###"
        {
          "eventId": "evt-1",
          "calendarId": "primary",
          "data": {
            "calendarId": "primary",
            "end": {
              "date": "2024-03-16"
            },
            "id": "evt-1",
            "start": {
              "date": "2024-03-15"
            },
            "summary": "Offsite"
          },
          "cancelled": false,
          "summary": "Offsite",
          "allDayEvent": true,
          "start": "2024-03-15T00:00:00.000Z",
          "startDate": "2024-03-15",
          "end": "2024-03-16T00:00:00.000Z",
          "endDate": "2024-03-16"
        }
        "###);
    }
}
