//! Legacy API namespace (`api.old()`).
//!
//! Each function is routed through the `_oldFunction` primitive with its
//! name under `__functionName`. Failures are re-raised under `old.<name>`
//! so callers see the function they actually called.

use calbridge_core::{Options, convert_event};
use calbridge_providers::{LEGACY_FUNCTION_KEY, LegacyFunction, RemoteCalls, RemoteFunction};
use serde_json::{Map, Value};

use crate::api::CalendarApi;
use crate::error::{ApiError, ApiResult};

/// The legacy namespace of a [`CalendarApi`].
pub struct LegacyApi<'a, R> {
    api: &'a CalendarApi<R>,
}

impl<'a, R: RemoteCalls> LegacyApi<'a, R> {
    pub(crate) fn new(api: &'a CalendarApi<R>) -> Self {
        Self { api }
    }

    /// Lists all calendars in the legacy shape.
    pub async fn get_calendars(&self, options: Option<Options>) -> ApiResult<Value> {
        self.execute(LegacyFunction::GetCalendars, options).await
    }

    pub async fn create_calendar(&self, options: Option<Options>) -> ApiResult<Value> {
        self.execute(LegacyFunction::CreateCalendar, options).await
    }

    pub async fn update_calendar(&self, options: Option<Options>) -> ApiResult<Value> {
        self.execute(LegacyFunction::UpdateCalendar, options).await
    }

    pub async fn remove_calendar(&self, options: Option<Options>) -> ApiResult<Value> {
        self.execute(LegacyFunction::RemoveCalendar, options).await
    }

    pub async fn clear_calendar(&self, options: Option<Options>) -> ApiResult<Value> {
        self.execute(LegacyFunction::ClearCalendar, options).await
    }

    /// Fetches one page of events.
    pub async fn get_events(&self, options: Option<Options>) -> ApiResult<Value> {
        self.execute(LegacyFunction::GetEvents, options).await
    }

    /// Synchronizes events, incrementally when `queryToken` is set.
    pub async fn sync_events(&self, options: Option<Options>) -> ApiResult<Value> {
        self.execute(LegacyFunction::SyncEvents, options).await
    }

    pub async fn create_event(&self, options: Option<Options>) -> ApiResult<Value> {
        self.execute(LegacyFunction::CreateEvent, options).await
    }

    pub async fn update_event(&self, options: Option<Options>) -> ApiResult<Value> {
        self.execute(LegacyFunction::UpdateEvent, options).await
    }

    pub async fn remove_event(&self, options: Option<Options>) -> ApiResult<Value> {
        self.execute(LegacyFunction::RemoveEvent, options).await
    }

    /// Converts a Google event into the legacy event shape.
    ///
    /// A missing event converts to an empty object.
    pub fn convert_event(&self, event: &Value) -> Value {
        convert_event(event)
            .map(|legacy| legacy.to_value())
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    /// Runs any legacy function by value.
    pub async fn execute(
        &self,
        function: LegacyFunction,
        options: Option<Options>,
    ) -> ApiResult<Value> {
        let mut options = options.unwrap_or_default();
        options.insert(
            LEGACY_FUNCTION_KEY.to_string(),
            Value::String(function.as_str().to_string()),
        );

        self.api
            .invoke(RemoteFunction::OldFunction, options)
            .await
            .map_err(|err| match err {
                ApiError::Endpoint(mut exc) => {
                    exc.replace_function(
                        RemoteFunction::OldFunction.as_str(),
                        &function.qualified_name(),
                    );
                    ApiError::Endpoint(exc)
                }
                other => other,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRemote;
    use calbridge_providers::ProviderError;
    use serde_json::json;

    #[tokio::test]
    async fn adds_function_name() {
        let api = CalendarApi::new(RecordingRemote::new());
        api.old()
            .get_events(json!({"calendarId": "primary"}).as_object().cloned())
            .await
            .unwrap();

        let (function, options) = api.remote().last_call();
        assert_eq!(function, RemoteFunction::OldFunction);
        assert_eq!(options["__functionName"], json!("getEvents"));
        assert_eq!(options["calendarId"], json!("primary"));
    }

    #[tokio::test]
    async fn missing_options_become_empty() {
        let api = CalendarApi::new(RecordingRemote::new());
        api.old().get_calendars(None).await.unwrap();

        let (_, options) = api.remote().last_call();
        assert_eq!(Value::Object(options), json!({"__functionName": "getCalendars"}));
    }

    #[tokio::test]
    async fn every_function_uses_its_name() {
        let api = CalendarApi::new(RecordingRemote::new());
        let old = api.old();
        old.create_calendar(None).await.unwrap();
        old.update_calendar(None).await.unwrap();
        old.remove_calendar(None).await.unwrap();
        old.clear_calendar(None).await.unwrap();
        old.sync_events(None).await.unwrap();
        old.create_event(None).await.unwrap();
        old.update_event(None).await.unwrap();
        old.remove_event(None).await.unwrap();

        let names: Vec<_> = api
            .remote()
            .calls()
            .into_iter()
            .map(|(_, options)| options["__functionName"].clone())
            .collect();
        assert_eq!(
            names,
            vec![
                json!("createCalendar"),
                json!("updateCalendar"),
                json!("removeCalendar"),
                json!("clearCalendar"),
                json!("syncEvents"),
                json!("createEvent"),
                json!("updateEvent"),
                json!("removeEvent"),
            ]
        );
    }

    #[tokio::test]
    async fn errors_are_renamed() {
        let api = CalendarApi::new(RecordingRemote::new());
        api.remote()
            .push_err(ProviderError::bad_request("_oldFunction rejected the request"));

        let err = api.old().sync_events(None).await.unwrap_err();
        let exc = err.exception().unwrap();
        assert_eq!(exc.function.as_deref(), Some("old.syncEvents"));
        assert_eq!(exc.message, "old.syncEvents rejected the request");
    }

    #[test]
    fn convert_missing_event_is_empty() {
        let api = CalendarApi::new(RecordingRemote::new());
        assert_eq!(api.old().convert_event(&Value::Null), json!({}));

        let converted = api.old().convert_event(&json!({"id": "e1", "summary": "Standup"}));
        assert_eq!(converted["eventId"], json!("e1"));
        assert_eq!(converted["allDayEvent"], json!(false));
    }
}
