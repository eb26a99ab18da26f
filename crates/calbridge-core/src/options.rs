//! Call options and argument normalization.
//!
//! Every public operation accepts loosely shaped arguments: an identifier
//! followed by an options object, an options object alone, or a URL followed
//! by a body. The helpers in this module fold those shapes into a single
//! [`Options`] object before it is handed to a remote primitive.
//!
//! Truthiness follows the rules callers of the calendar API expect: `null`,
//! `false`, `0`, and the empty string are "not present"; every object and
//! array is present, even when empty.

use serde_json::{Map, Value};
use thiserror::Error;

/// The canonical options shape sent to remote primitives.
pub type Options = Map<String, Value>;

/// Key carrying the calendar identifier.
pub const CALENDAR_ID: &str = "calendarId";
/// Key carrying the event identifier.
pub const EVENT_ID: &str = "eventId";
/// Key carrying the request path for generic HTTP calls.
pub const PATH: &str = "path";
/// Key carrying query parameters for generic HTTP calls.
pub const PARAMS: &str = "params";
/// Key carrying the request body for generic HTTP calls.
pub const BODY: &str = "body";

/// A leading positional argument of an overloaded call.
///
/// The same position may hold an identifier (`"primary"`) or the complete
/// options object, so the argument is kept loosely typed until
/// [`check_options`] or [`check_http_options`] folds it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CallArg {
    /// Nothing was passed.
    #[default]
    Absent,
    /// A scalar identifier or URL.
    Id(Value),
    /// A full options object.
    Options(Options),
}

impl CallArg {
    /// Returns `true` when the argument counts as present.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Absent => false,
            Self::Id(value) => is_truthy(value),
            Self::Options(_) => true,
        }
    }
}

impl From<Value> for CallArg {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Object(map) => Self::Options(map),
            other => Self::Id(other),
        }
    }
}

impl From<Options> for CallArg {
    fn from(options: Options) -> Self {
        Self::Options(options)
    }
}

impl From<&str> for CallArg {
    fn from(id: &str) -> Self {
        Self::Id(Value::String(id.to_string()))
    }
}

impl From<String> for CallArg {
    fn from(id: String) -> Self {
        Self::Id(Value::String(id))
    }
}

impl From<&String> for CallArg {
    fn from(id: &String) -> Self {
        Self::Id(Value::String(id.clone()))
    }
}

impl<T: Into<CallArg>> From<Option<T>> for CallArg {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// A required identifier was missing from the normalized options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Empty {key}")]
pub struct MissingValue {
    /// The options key that was empty.
    pub key: String,
}

/// Returns `true` when a JSON value counts as present.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Returns `true` when a remote response carries no result at all.
///
/// Falsy values and objects without keys are empty. Non-empty strings,
/// numbers and arrays are real results.
pub fn is_empty_response(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        other => !is_truthy(other),
    }
}

/// Folds an `(id, options)` pair into a single options object.
///
/// A present `id` that is itself an options object replaces `options`
/// entirely. A present scalar `id` is written into `options[id_key]`,
/// overriding any identifier already there. An absent `id` leaves the
/// options untouched.
pub fn check_options(
    id: impl Into<CallArg>,
    options: Option<Options>,
    id_key: Option<&str>,
) -> Options {
    let mut options = options.unwrap_or_default();
    match id.into() {
        CallArg::Options(replacement) => replacement,
        CallArg::Id(value) if is_truthy(&value) => {
            if let Some(key) = id_key {
                options.insert(key.to_string(), value);
            }
            options
        }
        _ => options,
    }
}

/// Folds a `(url, options)` pair into the generic HTTP options shape.
///
/// The result always carries the URL under `path` when a URL was given:
/// options that already look like an HTTP package (a present `path`,
/// `params` or `body`) get the URL written into `path`; anything else is
/// treated as the request body and wrapped as `{ path, body }`.
pub fn check_http_options(url: impl Into<CallArg>, options: Option<Value>) -> Options {
    let options = options
        .filter(is_truthy)
        .unwrap_or_else(|| Value::Object(Options::new()));
    match url.into() {
        CallArg::Options(replacement) => replacement,
        CallArg::Id(url) if is_truthy(&url) => match options {
            Value::Object(mut map) if is_http_package(&map) => {
                map.insert(PATH.to_string(), url);
                map
            }
            body => {
                let mut map = Options::new();
                map.insert(PATH.to_string(), url);
                map.insert(BODY.to_string(), body);
                map
            }
        },
        _ => match options {
            Value::Object(map) => map,
            _ => Options::new(),
        },
    }
}

fn is_http_package(options: &Options) -> bool {
    [PATH, PARAMS, BODY]
        .iter()
        .any(|key| options.get(*key).is_some_and(is_truthy))
}

/// Ensures `options[key]` is present.
pub fn check_value(options: &Options, key: &str) -> Result<(), MissingValue> {
    if options.get(key).is_some_and(is_truthy) {
        Ok(())
    } else {
        Err(MissingValue {
            key: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Options {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn truthiness_matches_calendar_callers() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!(12)));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!([])));
    }

    #[test]
    fn empty_response_detection() {
        assert!(is_empty_response(&Value::Null));
        assert!(is_empty_response(&json!({})));
        assert!(is_empty_response(&json!("")));
        assert!(!is_empty_response(&json!({"id": "primary"})));
        assert!(!is_empty_response(&json!([])));
        assert!(!is_empty_response(&json!("text")));
    }

    #[test]
    fn scalar_id_is_written_under_key() {
        let options = check_options("primary", None, Some(CALENDAR_ID));
        assert_eq!(options, obj(json!({"calendarId": "primary"})));
    }

    #[test]
    fn scalar_id_overrides_existing_key() {
        let options = check_options(
            "work",
            Some(obj(json!({"calendarId": "home", "maxResults": 5}))),
            Some(CALENDAR_ID),
        );
        assert_eq!(options, obj(json!({"calendarId": "work", "maxResults": 5})));
    }

    #[test]
    fn object_id_replaces_options() {
        let options = check_options(
            json!({"calendarId": "from-object"}),
            Some(obj(json!({"ignored": true}))),
            Some(CALENDAR_ID),
        );
        assert_eq!(options, obj(json!({"calendarId": "from-object"})));
    }

    #[test]
    fn empty_object_id_still_replaces_options() {
        let options = check_options(json!({}), Some(obj(json!({"calendarId": "x"}))), None);
        assert!(options.is_empty());
    }

    #[test]
    fn falsy_id_keeps_options() {
        let base = obj(json!({"calendarId": "kept"}));
        assert_eq!(
            check_options("", Some(base.clone()), Some(CALENDAR_ID)),
            base
        );
        assert_eq!(
            check_options(CallArg::Absent, Some(base.clone()), Some(CALENDAR_ID)),
            base
        );
        assert_eq!(
            check_options(Value::Null, Some(base.clone()), Some(CALENDAR_ID)),
            base
        );
    }

    #[test]
    fn scalar_id_without_key_is_ignored() {
        let options = check_options("primary", None, None);
        assert!(options.is_empty());
    }

    #[test]
    fn numeric_id_is_kept_as_number() {
        let options = check_options(json!(42), None, Some(EVENT_ID));
        assert_eq!(options.get(EVENT_ID), Some(&json!(42)));
    }

    #[test]
    fn event_then_calendar_normalization() {
        let options = check_options("evt-1", None, Some(EVENT_ID));
        let options = check_options("primary", Some(options), Some(CALENDAR_ID));
        assert_eq!(
            options,
            obj(json!({"calendarId": "primary", "eventId": "evt-1"}))
        );
    }

    #[test]
    fn http_bare_url_wraps_body() {
        let options = check_http_options(
            "/calendars/primary/events",
            Some(json!({"summary": "Standup"})),
        );
        assert_eq!(
            options,
            obj(json!({
                "path": "/calendars/primary/events",
                "body": {"summary": "Standup"}
            }))
        );
    }

    #[test]
    fn http_url_without_options_wraps_empty_body() {
        let options = check_http_options("/users/me/calendarList", None);
        assert_eq!(
            options,
            obj(json!({"path": "/users/me/calendarList", "body": {}}))
        );
    }

    #[test]
    fn http_package_gets_path() {
        let options = check_http_options(
            "/calendars",
            Some(json!({"params": {"maxResults": 10}, "path": "/old"})),
        );
        assert_eq!(
            options,
            obj(json!({"path": "/calendars", "params": {"maxResults": 10}}))
        );
    }

    #[test]
    fn http_object_url_is_the_package() {
        let options = check_http_options(
            json!({"path": "/calendars/x", "body": {"a": 1}}),
            Some(json!({"ignored": true})),
        );
        assert_eq!(options, obj(json!({"path": "/calendars/x", "body": {"a": 1}})));
    }

    #[test]
    fn http_scalar_body_is_wrapped() {
        let options = check_http_options("/x", Some(json!("raw")));
        assert_eq!(options, obj(json!({"path": "/x", "body": "raw"})));
    }

    #[test]
    fn http_falsy_body_becomes_empty_object() {
        for body in [json!(""), Value::Null, json!(false), json!(0)] {
            let options = check_http_options("/calendars", Some(body));
            assert_eq!(options, obj(json!({"path": "/calendars", "body": {}})));
        }
    }

    #[test]
    fn http_falsy_url_returns_options() {
        let options = check_http_options("", Some(json!({"path": "/kept"})));
        assert_eq!(options, obj(json!({"path": "/kept"})));
        assert!(check_http_options(CallArg::Absent, Some(json!("raw"))).is_empty());
    }

    #[test]
    fn check_value_reports_key() {
        let options = obj(json!({"calendarId": "", "eventId": "e"}));
        let err = check_value(&options, CALENDAR_ID).unwrap_err();
        assert_eq!(err.to_string(), "Empty calendarId");
        assert!(check_value(&options, EVENT_ID).is_ok());
        assert_eq!(
            check_value(&Options::new(), EVENT_ID).unwrap_err().key,
            "eventId"
        );
    }
}
