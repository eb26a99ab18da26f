//! Calendar API commands.
//!
//! Each command maps its arguments onto one [`CalendarApi`] operation and
//! returns the JSON result for printing.

use calbridge_core::{CallArg, DateInput, Options};
use calbridge_providers::{ErrorRemote, LegacyFunction, ProviderError, RemoteCalls};
use serde_json::Value;
use tracing::debug;

use crate::api::CalendarApi;
use crate::cli::{Command, Conversion, HttpVerb};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// The API as used by the CLI.
pub type DynApi = CalendarApi<Box<dyn RemoteCalls>>;

/// Builds the API from configuration.
///
/// A backend that cannot be configured is replaced by one that fails every
/// call, so configuration problems surface as call errors.
pub fn build_api(config: &ClientConfig, access_token: Option<&str>) -> DynApi {
    CalendarApi::new(build_remote(config, access_token))
}

#[cfg(feature = "google")]
fn build_remote(config: &ClientConfig, access_token: Option<&str>) -> Box<dyn RemoteCalls> {
    use calbridge_providers::google::GoogleRemote;

    let mut settings = config.google.clone().unwrap_or_default();
    if let Some(token) = access_token {
        settings.access_token = Some(token.to_string());
    }

    let remote = match settings.to_remote_config() {
        Ok(remote_config) => GoogleRemote::new(&remote_config),
        Err(err) => Err(ProviderError::configuration(err.to_string())),
    };

    match remote {
        Ok(remote) => Box::new(remote),
        Err(err) => {
            debug!("google backend unavailable: {}", err);
            Box::new(ErrorRemote::new("google", err))
        }
    }
}

#[cfg(not(feature = "google"))]
fn build_remote(_config: &ClientConfig, _access_token: Option<&str>) -> Box<dyn RemoteCalls> {
    debug!("built without a calendar backend");
    Box::new(ErrorRemote::new(
        "none",
        ProviderError::configuration("no calendar backend compiled in"),
    ))
}

/// Runs an API command and returns its result.
pub async fn run(api: &DynApi, command: Command) -> ClientResult<Value> {
    let value = match command {
        Command::FindOneCalendar {
            calendar_id,
            options,
        } => api
            .find_one_calendar(parse_id(&calendar_id)?, parse_options(options.as_deref())?)
            .await?
            .unwrap_or(Value::Null),
        Command::FindCalendars { params } => {
            api.find_calendars(parse_options(params.as_deref())?)
                .await?
        }
        Command::CreateCalendar { calendar } => {
            api.create_calendar(parse_options(calendar.as_deref())?)
                .await?
        }
        Command::UpdateCalendar {
            calendar_id,
            calendar,
        } => {
            api.update_calendar(parse_id(&calendar_id)?, parse_options(calendar.as_deref())?)
                .await?
        }
        Command::DeleteCalendar {
            calendar_id,
            options,
        } => {
            api.delete_calendar(parse_id(&calendar_id)?, parse_options(options.as_deref())?)
                .await?
        }
        Command::FindOneEvent {
            calendar_id,
            event_id,
            options,
        } => api
            .find_one_event(
                parse_id(&calendar_id)?,
                parse_id(&event_id)?,
                parse_options(options.as_deref())?,
            )
            .await?
            .unwrap_or(Value::Null),
        Command::FindEvents {
            calendar_id,
            params,
        } => {
            api.find_events(parse_id(&calendar_id)?, parse_options(params.as_deref())?)
                .await?
        }
        Command::CreateEvent { calendar_id, event } => {
            api.create_event(parse_id(&calendar_id)?, parse_options(event.as_deref())?)
                .await?
        }
        Command::UpdateEvent {
            calendar_id,
            event_id,
            event,
        } => {
            api.update_event(
                parse_id(&calendar_id)?,
                parse_id(&event_id)?,
                parse_options(event.as_deref())?,
            )
            .await?
        }
        Command::DeleteEvent {
            calendar_id,
            event_id,
            options,
        } => {
            api.delete_event(
                parse_id(&calendar_id)?,
                parse_id(&event_id)?,
                parse_options(options.as_deref())?,
            )
            .await?
        }
        Command::Http { verb, url, body } => {
            let url = parse_id(&url)?;
            let body = parse_json(body.as_deref())?;
            match verb {
                HttpVerb::Get => api.get(url).await?,
                HttpVerb::Delete => api.delete(url).await?,
                HttpVerb::Post => api.post(url, body).await?,
                HttpVerb::Put => api.put(url, body).await?,
                HttpVerb::Patch => api.patch(url, body).await?,
            }
        }
        Command::Old { function, options } => {
            let function = LegacyFunction::from_name(&function).ok_or_else(|| {
                ClientError::Usage(format!("unknown legacy function: {}", function))
            })?;
            api.old()
                .execute(function, parse_options(options.as_deref())?)
                .await?
        }
        Command::Convert { conversion, value } => convert(api, conversion, &value)?,
        Command::Config { .. } => {
            return Err(ClientError::Usage(
                "config commands do not call the API".to_string(),
            ));
        }
    };
    Ok(value)
}

fn convert(api: &DynApi, conversion: Conversion, value: &str) -> ClientResult<Value> {
    let input = || match value.trim().parse::<i64>() {
        Ok(millis) => DateInput::Millis(millis),
        Err(_) => DateInput::Text(value.to_string()),
    };
    let converted = match conversion {
        Conversion::ToDateTime => api.to_google_date_time(input())?,
        Conversion::ToDate => api.to_google_date(input())?,
        Conversion::FromDateTime => api.from_google_date_time(value)?.to_rfc3339(),
        Conversion::FromDate => api.from_google_date(value)?.to_string(),
    };
    Ok(Value::String(converted))
}

/// Parses an identifier argument; a JSON object becomes the options.
pub fn parse_id(raw: &str) -> ClientResult<CallArg> {
    if raw.trim_start().starts_with('{') {
        let options = parse_options(Some(raw))?.unwrap_or_default();
        Ok(CallArg::Options(options))
    } else {
        Ok(CallArg::from(raw))
    }
}

/// Parses an optional JSON object argument.
pub fn parse_options(raw: Option<&str>) -> ClientResult<Option<Options>> {
    match parse_json(raw)? {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(ClientError::Usage(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

/// Parses an optional JSON argument.
pub fn parse_json(raw: Option<&str>) -> ClientResult<Option<Value>> {
    raw.map(|text| {
        serde_json::from_str(text)
            .map_err(|e| ClientError::Usage(format!("invalid JSON {:?}: {}", text, e)))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRemote;
    use calbridge_providers::RemoteFunction;
    use serde_json::json;

    fn recording_api() -> DynApi {
        CalendarApi::new(Box::new(RecordingRemote::new()))
    }

    #[test]
    fn parse_id_accepts_objects() {
        assert_eq!(parse_id("primary").unwrap(), CallArg::from("primary"));
        match parse_id(r#"{"calendarId": "team"}"#).unwrap() {
            CallArg::Options(options) => assert_eq!(options["calendarId"], json!("team")),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(parse_id("{not json").is_err());
    }

    #[test]
    fn parse_options_requires_object() {
        assert_eq!(parse_options(None).unwrap(), None);
        assert!(parse_options(Some("[1, 2]")).is_err());
        assert_eq!(
            parse_options(Some(r#"{"a": 1}"#)).unwrap().unwrap()["a"],
            json!(1)
        );
    }

    #[tokio::test]
    async fn runs_event_command() {
        let api = recording_api();
        let result = run(
            &api,
            Command::FindEvents {
                calendar_id: "primary".to_string(),
                params: Some(r#"{"maxResults": 5}"#.to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(result, json!({"calendarId": "primary", "maxResults": 5}));
    }

    #[tokio::test]
    async fn runs_http_command() {
        let api = recording_api();
        let result = run(
            &api,
            Command::Http {
                verb: HttpVerb::Post,
                url: "/calendars".to_string(),
                body: Some(r#"{"summary": "Team"}"#.to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(result, json!({"path": "/calendars", "body": {"summary": "Team"}}));
    }

    #[tokio::test]
    async fn runs_legacy_command() {
        let api = recording_api();
        let result = run(
            &api,
            Command::Old {
                function: "syncEvents".to_string(),
                options: Some(r#"{"calendarId": "primary"}"#.to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(result["__functionName"], json!("syncEvents"));

        let err = run(
            &api,
            Command::Old {
                function: "nope".to_string(),
                options: None,
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("unknown legacy function"));
    }

    #[tokio::test]
    async fn runs_conversions() {
        let api = recording_api();
        let result = run(
            &api,
            Command::Convert {
                conversion: Conversion::ToDateTime,
                value: "0".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(result, json!("1970-01-01T00:00:00.000Z"));

        let result = run(
            &api,
            Command::Convert {
                conversion: Conversion::FromDate,
                value: "2024-03-15".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(result, json!("2024-03-15"));
    }

    #[tokio::test]
    async fn unconfigured_backend_fails_at_call_time() {
        let api = build_api(&ClientConfig::default(), None);
        let err = run(
            &api,
            Command::FindCalendars { params: None },
        )
        .await
        .unwrap_err();
        match err {
            ClientError::Api(api_err) => {
                let exc = api_err.exception().unwrap();
                assert_eq!(exc.code, "configuration_error");
                assert_eq!(exc.function.as_deref(), Some(RemoteFunction::FindCalendars.as_str()));
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
