//! Legacy API on top of the Calendar API.
//!
//! The legacy functions predate the generic primitives and work with
//! flattened calendar and event shapes. They all arrive through
//! `_oldFunction`, with the concrete function named by `__functionName`.

use calbridge_core::{
    CALENDAR_ID, DateInput, EVENT_ID, Options, convert_event, is_truthy, to_google_date,
    to_google_date_time,
};
use chrono::Utc;
use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use super::client::{
    ApiRequest, GoogleTransport, PROVIDER, calendar_path, event_path, events_path, query_pairs,
};
use super::remote::required_id;
use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};
use crate::remote::{LEGACY_FUNCTION_KEY, LegacyFunction};

/// Page size used while syncing.
const SYNC_PAGE_SIZE: u64 = 2500;

/// Maximum number of pages fetched by a single sync.
const SYNC_MAX_PAGES: usize = 10;

/// How many times an invalid sync token may trigger a full sync.
const SYNC_MAX_FULL_RESYNCS: u32 = 2;

/// Runs the legacy function named in `options`.
pub(crate) async fn dispatch<T: GoogleTransport>(
    transport: &T,
    mut options: Options,
) -> ProviderResult<Value> {
    let function = options
        .remove(LEGACY_FUNCTION_KEY)
        .and_then(|v| v.as_str().and_then(LegacyFunction::from_name))
        .ok_or_else(|| {
            ProviderError::bad_request("Invalid function request").with_provider(PROVIDER)
        })?;

    debug!(%function, "legacy request received");
    let legacy = Legacy { transport };
    let response = match function {
        LegacyFunction::GetCalendars => legacy.get_calendars().await,
        LegacyFunction::CreateCalendar => legacy.create_calendar(&options).await,
        LegacyFunction::UpdateCalendar => legacy.update_calendar(&options).await,
        LegacyFunction::RemoveCalendar => legacy.remove_calendar(&options).await,
        LegacyFunction::ClearCalendar => legacy.clear_calendar(&options).await,
        LegacyFunction::GetEvents => legacy.get_events(&options).await,
        LegacyFunction::SyncEvents => legacy.sync_events(&options).await,
        LegacyFunction::CreateEvent => legacy.create_event(&options).await,
        LegacyFunction::UpdateEvent => legacy.update_event(&options).await,
        LegacyFunction::RemoveEvent => legacy.remove_event(&options).await,
    }?;
    info!(%function, "legacy request completed");
    Ok(response)
}

/// Flattened calendar returned by the legacy functions.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LegacyCalendar {
    #[serde(skip_serializing_if = "Option::is_none")]
    calendar_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timezone: Option<String>,
    data: Value,
}

impl LegacyCalendar {
    fn from_google(calendar: Value) -> Self {
        let text = |key: &str| text_field(&calendar, key);
        Self {
            calendar_id: text("id"),
            summary: text("summary"),
            description: text("description"),
            location: text("location"),
            timezone: text("timeZone"),
            data: calendar,
        }
    }

    fn into_value(self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Query for one page of events.
#[derive(Debug, Default)]
struct EventQuery {
    query: Option<String>,
    from: Option<Value>,
    to: Option<Value>,
    page_token: Option<String>,
    max_results: Option<u64>,
    sync_token: Option<String>,
    data: Option<Options>,
}

impl EventQuery {
    fn into_pairs(self) -> ProviderResult<Vec<(String, String)>> {
        let mut pairs = self
            .data
            .as_ref()
            .map(|data| query_pairs(data, &[]))
            .unwrap_or_default();

        let mut set = |key: &str, value: String| {
            pairs.retain(|(k, _)| k != key);
            pairs.push((key.to_string(), value));
        };

        if let Some(token) = self.page_token {
            set("pageToken", token);
        }
        if let Some(max) = self.max_results {
            set("maxResults", max.to_string());
        }
        if let Some(token) = self.sync_token {
            // Google rejects filters combined with a sync token.
            set("syncToken", token);
        } else {
            if let Some(q) = self.query {
                set("q", q);
            }
            if let Some(from) = self.from {
                set("timeMin", legacy_date_time(&from)?);
            }
            if let Some(to) = self.to {
                set("timeMax", legacy_date_time(&to)?);
            }
        }
        Ok(pairs)
    }
}

struct Legacy<'a, T> {
    transport: &'a T,
}

impl<T: GoogleTransport> Legacy<'_, T> {
    async fn get_calendars(&self) -> ProviderResult<Value> {
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = ApiRequest::new(Method::GET, "/users/me/calendarList");
            if let Some(token) = page_token.take() {
                request = request.with_query(vec![("pageToken".to_string(), token)]);
            }
            let page = self.transport.execute(request).await?;
            if let Some(items) = page.get("items").and_then(Value::as_array) {
                calendars.extend(
                    items
                        .iter()
                        .cloned()
                        .map(|c| LegacyCalendar::from_google(c).into_value()),
                );
            }
            page_token = text_field(&page, "nextPageToken");
            if page_token.is_none() {
                break;
            }
        }
        Ok(json!({ "calendars": calendars }))
    }

    async fn create_calendar(&self, options: &Options) -> ProviderResult<Value> {
        let request =
            ApiRequest::new(Method::POST, "/calendars").with_body(calendar_body(options));
        let created = self.transport.execute(request).await?;
        Ok(LegacyCalendar::from_google(created).into_value())
    }

    async fn update_calendar(&self, options: &Options) -> ProviderResult<Value> {
        let calendar_id = required_id(options, CALENDAR_ID)?;
        let request = ApiRequest::new(Method::PATCH, calendar_path(&calendar_id))
            .with_body(calendar_body(options));
        let updated = self.transport.execute(request).await?;
        Ok(LegacyCalendar::from_google(updated).into_value())
    }

    async fn remove_calendar(&self, options: &Options) -> ProviderResult<Value> {
        let calendar_id = required_id(options, CALENDAR_ID)?;
        self.transport
            .execute(ApiRequest::new(Method::DELETE, calendar_path(&calendar_id)))
            .await?;
        Ok(json!({"result": "ok", "deleted": true, "calendarId": calendar_id}))
    }

    async fn clear_calendar(&self, options: &Options) -> ProviderResult<Value> {
        let calendar_id = required_id(options, CALENDAR_ID)?;
        let path = format!("{}/clear", calendar_path(&calendar_id));
        self.transport
            .execute(ApiRequest::new(Method::POST, path))
            .await?;
        Ok(json!({"result": "ok", "cleared": true, "calendarId": calendar_id}))
    }

    async fn get_events(&self, options: &Options) -> ProviderResult<Value> {
        let calendar_id = required_id(options, CALENDAR_ID)?;
        let query = EventQuery {
            query: text_option(options, "query"),
            from: truthy_option(options, "from"),
            to: truthy_option(options, "to"),
            page_token: text_option(options, "pageToken"),
            max_results: options.get("maxResults").and_then(Value::as_u64),
            sync_token: text_option(options, "queryToken"),
            data: options.get("data").and_then(Value::as_object).cloned(),
        };
        let page = self.events_page(&calendar_id, query).await?;
        Ok(Value::Object(page))
    }

    async fn sync_events(&self, options: &Options) -> ProviderResult<Value> {
        let calendar_id = required_id(options, CALENDAR_ID)?;
        let mut sync_token = text_option(options, "queryToken");
        let mut resyncs = 0;
        loop {
            match self.sync_pages(&calendar_id, sync_token.clone()).await {
                Ok(result) => return Ok(result),
                Err(err) if resyncs < SYNC_MAX_FULL_RESYNCS && requires_full_sync(&err) => {
                    resyncs += 1;
                    warn!(
                        %calendar_id,
                        attempt = resyncs,
                        "sync token rejected, falling back to full sync: {}",
                        err.message()
                    );
                    sync_token = None;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn create_event(&self, options: &Options) -> ProviderResult<Value> {
        let calendar_id = required_id(options, CALENDAR_ID)?;
        let request = ApiRequest::new(Method::POST, events_path(&calendar_id))
            .with_body(event_body(options)?);
        let created = self.transport.execute(request).await?;
        Ok(legacy_event(&calendar_id, &created))
    }

    async fn update_event(&self, options: &Options) -> ProviderResult<Value> {
        let calendar_id = required_id(options, CALENDAR_ID)?;
        let event_id = required_id(options, EVENT_ID)?;
        let mut body = event_body(options)?;
        if let Some(map) = body.as_object_mut() {
            map.insert("id".to_string(), Value::String(event_id.clone()));
        }
        let request = ApiRequest::new(Method::PATCH, event_path(&calendar_id, &event_id))
            .with_body(body);
        let updated = self.transport.execute(request).await?;
        Ok(legacy_event(&calendar_id, &updated))
    }

    async fn remove_event(&self, options: &Options) -> ProviderResult<Value> {
        let calendar_id = required_id(options, CALENDAR_ID)?;
        let event_id = required_id(options, EVENT_ID)?;
        self.transport
            .execute(ApiRequest::new(
                Method::DELETE,
                event_path(&calendar_id, &event_id),
            ))
            .await?;
        Ok(json!({
            "result": "ok",
            "deleted": true,
            "calendarId": calendar_id,
            "eventId": event_id,
        }))
    }

    /// Collects up to [`SYNC_MAX_PAGES`] pages of events.
    ///
    /// Without a sync token this is a full sync of events from now on.
    async fn sync_pages(
        &self,
        calendar_id: &str,
        sync_token: Option<String>,
    ) -> ProviderResult<Value> {
        let full = sync_token.is_none();
        let from = full.then(|| json!(Utc::now().timestamp_millis()));
        debug!(%calendar_id, full, "syncing events");

        let mut events = Vec::new();
        let mut info = Value::Null;
        let mut query_token = Value::Null;
        let mut page_token = None;

        for _ in 0..SYNC_MAX_PAGES {
            let query = EventQuery {
                from: from.clone(),
                page_token: page_token.take(),
                max_results: Some(SYNC_PAGE_SIZE),
                sync_token: sync_token.clone(),
                ..EventQuery::default()
            };
            let mut page = self.events_page(calendar_id, query).await?;

            if let Some(Value::Array(items)) = page.remove("events") {
                events.extend(items);
            }
            if let Some(page_info) = page.remove("info") {
                info = page_info;
            }
            query_token = page.remove("queryToken").unwrap_or(Value::Null);
            page_token = page
                .remove("nextPageToken")
                .and_then(|v| v.as_str().map(str::to_string));

            if page_token.is_none() {
                break;
            }
        }

        Ok(json!({
            "result": "ok",
            "calendarId": calendar_id,
            "events": events,
            "info": info,
            "queryToken": query_token,
        }))
    }

    /// Fetches a single page of events in the legacy shape.
    async fn events_page(
        &self,
        calendar_id: &str,
        query: EventQuery,
    ) -> ProviderResult<Map<String, Value>> {
        let request =
            ApiRequest::new(Method::GET, events_path(calendar_id)).with_query(query.into_pairs()?);
        let mut page = match self.transport.execute(request).await? {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let events: Vec<Value> = match page.remove("items") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|event| legacy_event(calendar_id, event))
                .collect(),
            _ => Vec::new(),
        };
        let next_page_token = page.remove("nextPageToken").filter(is_truthy);
        let next_sync_token = page.remove("nextSyncToken").filter(is_truthy);

        let mut response = Map::new();
        response.insert("result".to_string(), json!("ok"));
        response.insert(CALENDAR_ID.to_string(), json!(calendar_id));
        response.insert("events".to_string(), Value::Array(events));
        if let Some(token) = next_page_token {
            response.insert("nextPageToken".to_string(), token);
        }
        if let Some(token) = next_sync_token {
            response.insert("queryToken".to_string(), token);
        }
        response.insert("info".to_string(), Value::Object(page));
        Ok(response)
    }
}

/// True when Google rejected the sync token and a full sync is needed.
fn requires_full_sync(err: &ProviderError) -> bool {
    err.code() == ProviderErrorCode::Gone || err.message().contains("ync token")
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn text_option(options: &Options, key: &str) -> Option<String> {
    options
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn truthy_option(options: &Options, key: &str) -> Option<Value> {
    options.get(key).filter(|v| is_truthy(v)).cloned()
}

fn legacy_date_time(value: &Value) -> ProviderResult<String> {
    DateInput::try_from(value)
        .and_then(|input| to_google_date_time(input))
        .map_err(|e| ProviderError::bad_request(e.to_string()).with_provider(PROVIDER))
}

fn legacy_date(value: &Value) -> ProviderResult<String> {
    DateInput::try_from(value)
        .and_then(|input| to_google_date(input))
        .map_err(|e| ProviderError::bad_request(e.to_string()).with_provider(PROVIDER))
}

/// Builds a Google calendar from legacy fields; `data` is the base.
fn calendar_body(options: &Options) -> Value {
    let mut body = options
        .get("data")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    for (legacy, google) in [
        ("summary", "summary"),
        ("description", "description"),
        ("location", "location"),
        ("timezone", "timeZone"),
    ] {
        if let Some(text) = text_option(options, legacy) {
            body.insert(google.to_string(), Value::String(text));
        }
    }
    Value::Object(body)
}

/// Builds a Google event from legacy fields; `data` is the base.
fn event_body(options: &Options) -> ProviderResult<Value> {
    let mut body = options
        .get("data")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let all_day = options.get("allDayEvent").is_some_and(is_truthy);
    let timezone = text_option(options, "timezone");

    for side in ["start", "end"] {
        let Some(value) = truthy_option(options, side) else {
            continue;
        };
        let mut boundary = Map::new();
        if all_day {
            boundary.insert("date".to_string(), json!(legacy_date(&value)?));
            boundary.insert("dateTime".to_string(), Value::Null);
        } else {
            boundary.insert("date".to_string(), Value::Null);
            boundary.insert("dateTime".to_string(), json!(legacy_date_time(&value)?));
        }
        if let Some(ref tz) = timezone {
            boundary.insert("timeZone".to_string(), json!(tz));
        }
        body.insert(side.to_string(), Value::Object(boundary));
    }

    for key in ["summary", "description", "location"] {
        if let Some(text) = text_option(options, key) {
            body.insert(key.to_string(), Value::String(text));
        }
    }
    Ok(Value::Object(body))
}

/// Converts a Google event into the legacy shape, filling in the calendar.
fn legacy_event(calendar_id: &str, event: &Value) -> Value {
    match convert_event(event) {
        Some(mut legacy) => {
            legacy.calendar_id.get_or_insert_with(|| calendar_id.to_string());
            legacy.to_value()
        }
        None => Value::Object(Map::new()),
    }
}
