//! Google Calendar implementation of the remote primitives.

use calbridge_core::{BODY, CALENDAR_ID, EVENT_ID, Options, PARAMS, PATH, is_truthy};
use reqwest::Method;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::client::{
    ApiRequest, GoogleCalendarClient, GoogleTransport, PROVIDER, body_without, calendar_path,
    event_path, events_path, query_pairs,
};
use super::config::GoogleConfig;
use super::legacy;
use crate::error::{ProviderError, ProviderResult};
use crate::remote::{BoxFuture, RemoteCalls, RemoteFunction};

/// Google Calendar remote.
///
/// Every [`RemoteFunction`] maps onto one or two Calendar API v3 requests.
/// Failed lookups inside `_deleteCalendar` and `_deleteEvent` are returned
/// as flagged exception objects rather than errors.
pub struct GoogleRemote<T = GoogleCalendarClient> {
    transport: T,
}

impl GoogleRemote<GoogleCalendarClient> {
    /// Creates a remote talking to the Calendar API over HTTP.
    pub fn new(config: &GoogleConfig) -> ProviderResult<Self> {
        Ok(Self::with_transport(GoogleCalendarClient::new(config)?))
    }
}

impl<T: GoogleTransport> GoogleRemote<T> {
    /// Creates a remote on top of an existing transport.
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn dispatch(&self, function: RemoteFunction, options: Options) -> ProviderResult<Value> {
        let t = &self.transport;
        match function {
            RemoteFunction::FindOneCalendar => {
                let id = required_id(&options, CALENDAR_ID)?;
                t.execute(ApiRequest::new(Method::GET, calendar_path(&id)))
                    .await
            }
            RemoteFunction::FindCalendars => {
                let request = ApiRequest::new(Method::GET, "/users/me/calendarList")
                    .with_query(query_pairs(&options, &[]));
                t.execute(request).await
            }
            RemoteFunction::CreateCalendar => {
                let request = ApiRequest::new(Method::POST, "/calendars")
                    .with_body(body_without(&options, &[CALENDAR_ID]));
                t.execute(request).await
            }
            RemoteFunction::UpdateCalendar => {
                let id = id_value(&options, "id")
                    .map(Ok)
                    .unwrap_or_else(|| required_id(&options, CALENDAR_ID))?;
                let request = ApiRequest::new(Method::PUT, calendar_path(&id))
                    .with_body(body_without(&options, &[CALENDAR_ID]));
                t.execute(request).await
            }
            RemoteFunction::DeleteCalendar => self.delete_calendar(&options).await,
            RemoteFunction::FindOneEvent => {
                let calendar_id = required_id(&options, CALENDAR_ID)?;
                let event_id = required_id(&options, EVENT_ID)?;
                let request = ApiRequest::new(Method::GET, event_path(&calendar_id, &event_id))
                    .with_query(query_pairs(&options, &[CALENDAR_ID, EVENT_ID]));
                t.execute(request).await
            }
            RemoteFunction::FindEvents => {
                let calendar_id = required_id(&options, CALENDAR_ID)?;
                let request = ApiRequest::new(Method::GET, events_path(&calendar_id))
                    .with_query(query_pairs(&options, &[CALENDAR_ID]));
                t.execute(request).await
            }
            RemoteFunction::CreateEvent => {
                let calendar_id = required_id(&options, CALENDAR_ID)?;
                let request = ApiRequest::new(Method::POST, events_path(&calendar_id))
                    .with_body(body_without(&options, &[CALENDAR_ID, EVENT_ID]));
                t.execute(request).await
            }
            RemoteFunction::UpdateEvent => {
                let calendar_id = required_id(&options, CALENDAR_ID)?;
                let event_id = required_id(&options, EVENT_ID)?;
                let request = ApiRequest::new(Method::PUT, event_path(&calendar_id, &event_id))
                    .with_body(body_without(&options, &[CALENDAR_ID, EVENT_ID]));
                t.execute(request).await
            }
            RemoteFunction::DeleteEvent => self.delete_event(&options).await,
            RemoteFunction::GetRequest => self.generic(Method::GET, &options).await,
            RemoteFunction::PostRequest => self.generic(Method::POST, &options).await,
            RemoteFunction::PutRequest => self.generic(Method::PUT, &options).await,
            RemoteFunction::PatchRequest => self.generic(Method::PATCH, &options).await,
            RemoteFunction::DeleteRequest => self.generic(Method::DELETE, &options).await,
            RemoteFunction::OldFunction => legacy::dispatch(t, options).await,
        }
    }

    async fn delete_calendar(&self, options: &Options) -> ProviderResult<Value> {
        let id = required_id(options, CALENDAR_ID)?;
        let path = calendar_path(&id);

        let calendar = match self
            .transport
            .execute(ApiRequest::new(Method::GET, path.clone()))
            .await
        {
            Ok(calendar) => calendar,
            Err(err) => {
                debug!(calendar_id = %id, "calendar lookup failed before delete");
                return Ok(err
                    .into_exception(RemoteFunction::DeleteCalendar.as_str())
                    .to_value());
            }
        };

        let primary = id == "primary" || calendar.get("primary").is_some_and(is_truthy);
        if primary {
            info!(calendar_id = %id, "clearing primary calendar");
            self.transport
                .execute(ApiRequest::new(Method::POST, format!("{}/clear", path)))
                .await?;
        } else {
            info!(calendar_id = %id, "deleting secondary calendar");
            self.transport
                .execute(ApiRequest::new(Method::DELETE, path))
                .await?;
        }
        Ok(calendar)
    }

    async fn delete_event(&self, options: &Options) -> ProviderResult<Value> {
        let calendar_id = required_id(options, CALENDAR_ID)?;
        let event_id = required_id(options, EVENT_ID)?;
        let path = event_path(&calendar_id, &event_id);

        let event = match self
            .transport
            .execute(ApiRequest::new(Method::GET, path.clone()))
            .await
        {
            Ok(event) => event,
            Err(err) => {
                debug!(%calendar_id, %event_id, "event lookup failed before delete");
                return Ok(err
                    .into_exception(RemoteFunction::DeleteEvent.as_str())
                    .to_value());
            }
        };

        info!(%calendar_id, %event_id, "deleting event");
        self.transport
            .execute(ApiRequest::new(Method::DELETE, path))
            .await?;
        Ok(event)
    }

    async fn generic(&self, method: Method, options: &Options) -> ProviderResult<Value> {
        let path = options
            .get(PATH)
            .and_then(Value::as_str)
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ProviderError::bad_request("Empty path").with_provider(PROVIDER))?;

        let mut request = ApiRequest::new(method.clone(), path);
        if method == Method::GET || method == Method::DELETE {
            if let Some(params) = options.get(PARAMS).and_then(Value::as_object) {
                request = request.with_query(query_pairs(params, &[]));
            }
        } else {
            request = request.with_body(request_body(options));
        }
        self.transport.execute(request).await
    }
}

impl<T: GoogleTransport> RemoteCalls for GoogleRemote<T> {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn call(
        &self,
        function: RemoteFunction,
        options: Options,
    ) -> BoxFuture<'_, ProviderResult<Value>> {
        Box::pin(async move {
            debug!(%function, "executing google primitive");
            self.dispatch(function, options).await
        })
    }
}

/// Body of a generic request: `body`, then `params`, then `{}`.
fn request_body(options: &Options) -> Value {
    [BODY, PARAMS]
        .iter()
        .filter_map(|key| options.get(*key))
        .find(|v| is_truthy(v))
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()))
}

/// Reads an identifier option. Numbers are accepted and rendered as text.
pub(crate) fn id_value(options: &Options, key: &str) -> Option<String> {
    match options.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn required_id(options: &Options, key: &str) -> ProviderResult<String> {
    id_value(options, key)
        .ok_or_else(|| ProviderError::bad_request(format!("Empty {}", key)).with_provider(PROVIDER))
}
