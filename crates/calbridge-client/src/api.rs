//! The public calendar API.
//!
//! Every operation folds its loosely typed arguments into a single options
//! object, checks the identifiers it needs, delegates to a remote primitive
//! and post-processes the result. No retries happen here; failures are
//! surfaced as [`ApiError::Endpoint`] tagged with the primitive name.

use calbridge_core::{
    CALENDAR_ID, CallArg, DateInput, EVENT_ID, EndpointException, Options, check_http_options,
    check_options, check_value, is_empty_response,
};
use calbridge_providers::{RemoteCalls, RemoteFunction};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::legacy::LegacyApi;

/// Calendar API facade over a [`RemoteCalls`] backend.
pub struct CalendarApi<R> {
    remote: R,
}

impl<R: RemoteCalls> CalendarApi<R> {
    /// Creates a new API on top of `remote`.
    pub fn new(remote: R) -> Self {
        Self { remote }
    }

    /// Returns the backend.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Returns the legacy namespace.
    pub fn old(&self) -> LegacyApi<'_, R> {
        LegacyApi::new(self)
    }

    // -- calendars --------------------------------------------------------

    /// Finds a calendar. Returns `None` when the backend has nothing.
    pub async fn find_one_calendar(
        &self,
        calendar_id: impl Into<CallArg>,
        options: Option<Options>,
    ) -> ApiResult<Option<Value>> {
        let options = check_options(calendar_id, options, Some(CALENDAR_ID));
        check_value(&options, CALENDAR_ID)?;
        let response = self.invoke(RemoteFunction::FindOneCalendar, options).await?;
        Ok(non_empty(response))
    }

    /// Lists the calendars of the user.
    pub async fn find_calendars(&self, params: Option<Options>) -> ApiResult<Value> {
        let params = check_options(CallArg::Absent, params, None);
        self.invoke(RemoteFunction::FindCalendars, params).await
    }

    /// Creates a calendar.
    pub async fn create_calendar(&self, calendar: Option<Options>) -> ApiResult<Value> {
        let calendar = check_options(CallArg::Absent, calendar, None);
        self.invoke(RemoteFunction::CreateCalendar, calendar).await
    }

    /// Updates a calendar.
    pub async fn update_calendar(
        &self,
        calendar_id: impl Into<CallArg>,
        calendar: Option<Options>,
    ) -> ApiResult<Value> {
        let calendar = check_options(calendar_id, calendar, Some(CALENDAR_ID));
        check_value(&calendar, CALENDAR_ID)?;
        self.invoke(RemoteFunction::UpdateCalendar, calendar).await
    }

    /// Deletes a calendar (a primary calendar is cleared instead).
    ///
    /// The backend may report failure by returning an exception object; it
    /// is raised as an error.
    pub async fn delete_calendar(
        &self,
        calendar_id: impl Into<CallArg>,
        options: Option<Options>,
    ) -> ApiResult<Value> {
        let options = check_options(calendar_id, options, Some(CALENDAR_ID));
        check_value(&options, CALENDAR_ID)?;
        let response = self.invoke(RemoteFunction::DeleteCalendar, options).await?;
        raise_exception(RemoteFunction::DeleteCalendar, response)
    }

    // -- events -----------------------------------------------------------

    /// Finds an event. Returns `None` when the backend has nothing.
    pub async fn find_one_event(
        &self,
        calendar_id: impl Into<CallArg>,
        event_id: impl Into<CallArg>,
        options: Option<Options>,
    ) -> ApiResult<Option<Value>> {
        let options = event_options(calendar_id, event_id, options)?;
        let response = self.invoke(RemoteFunction::FindOneEvent, options).await?;
        Ok(non_empty(response))
    }

    /// Lists the events of a calendar.
    pub async fn find_events(
        &self,
        calendar_id: impl Into<CallArg>,
        params: Option<Options>,
    ) -> ApiResult<Value> {
        let params = check_options(calendar_id, params, Some(CALENDAR_ID));
        check_value(&params, CALENDAR_ID)?;
        self.invoke(RemoteFunction::FindEvents, params).await
    }

    /// Creates an event.
    pub async fn create_event(
        &self,
        calendar_id: impl Into<CallArg>,
        event: Option<Options>,
    ) -> ApiResult<Value> {
        let event = check_options(calendar_id, event, Some(CALENDAR_ID));
        check_value(&event, CALENDAR_ID)?;
        self.invoke(RemoteFunction::CreateEvent, event).await
    }

    /// Updates an event.
    pub async fn update_event(
        &self,
        calendar_id: impl Into<CallArg>,
        event_id: impl Into<CallArg>,
        event: Option<Options>,
    ) -> ApiResult<Value> {
        let event = event_options(calendar_id, event_id, event)?;
        self.invoke(RemoteFunction::UpdateEvent, event).await
    }

    /// Deletes an event, returning it as it was before deletion.
    pub async fn delete_event(
        &self,
        calendar_id: impl Into<CallArg>,
        event_id: impl Into<CallArg>,
        options: Option<Options>,
    ) -> ApiResult<Value> {
        let options = event_options(calendar_id, event_id, options)?;
        let response = self.invoke(RemoteFunction::DeleteEvent, options).await?;
        raise_exception(RemoteFunction::DeleteEvent, response)
    }

    // -- generic HTTP -----------------------------------------------------

    /// Sends a GET request.
    pub async fn get(&self, url: impl Into<CallArg>) -> ApiResult<Value> {
        let options = check_http_options(url, Some(json!({})));
        self.invoke(RemoteFunction::GetRequest, options).await
    }

    /// Sends a POST request.
    pub async fn post(&self, url: impl Into<CallArg>, options: Option<Value>) -> ApiResult<Value> {
        let options = check_http_options(url, options);
        self.invoke(RemoteFunction::PostRequest, options).await
    }

    /// Sends a PUT request.
    pub async fn put(&self, url: impl Into<CallArg>, options: Option<Value>) -> ApiResult<Value> {
        let options = check_http_options(url, options);
        self.invoke(RemoteFunction::PutRequest, options).await
    }

    /// Sends a PATCH request.
    pub async fn patch(&self, url: impl Into<CallArg>, options: Option<Value>) -> ApiResult<Value> {
        let options = check_http_options(url, options);
        self.invoke(RemoteFunction::PatchRequest, options).await
    }

    /// Sends a DELETE request.
    pub async fn delete(&self, url: impl Into<CallArg>) -> ApiResult<Value> {
        let options = check_http_options(url, Some(json!({})));
        self.invoke(RemoteFunction::DeleteRequest, options).await
    }

    // -- conversions ------------------------------------------------------

    /// Renders a date as a Google datetime (`2024-03-15T10:00:00.000Z`).
    pub fn to_google_date_time(&self, value: impl Into<DateInput>) -> ApiResult<String> {
        Ok(calbridge_core::to_google_date_time(value)?)
    }

    /// Renders a date as a Google date (`2024-03-15`).
    pub fn to_google_date(&self, value: impl Into<DateInput>) -> ApiResult<String> {
        Ok(calbridge_core::to_google_date(value)?)
    }

    /// Parses a Google datetime.
    pub fn from_google_date_time(&self, value: &str) -> ApiResult<DateTime<Utc>> {
        Ok(calbridge_core::from_google_date_time(value)?)
    }

    /// Parses a Google date.
    pub fn from_google_date(&self, value: &str) -> ApiResult<NaiveDate> {
        Ok(calbridge_core::from_google_date(value)?)
    }

    /// Calls a primitive, tagging failures with its name.
    pub(crate) async fn invoke(
        &self,
        function: RemoteFunction,
        options: Options,
    ) -> ApiResult<Value> {
        debug!(%function, backend = self.remote.name(), "dispatching remote call");
        match self.remote.call(function, options).await {
            Ok(response) => {
                info!(%function, "remote call completed");
                Ok(response)
            }
            Err(err) => {
                let exc = err.into_exception(function.as_str());
                warn!(%function, code = %exc.code, "remote call failed: {}", exc.message);
                Err(ApiError::Endpoint(exc))
            }
        }
    }
}

/// Folds event arguments: `eventId` first, then `calendarId`.
fn event_options(
    calendar_id: impl Into<CallArg>,
    event_id: impl Into<CallArg>,
    options: Option<Options>,
) -> ApiResult<Options> {
    let options = check_options(event_id, options, Some(EVENT_ID));
    let options = check_options(calendar_id, Some(options), Some(CALENDAR_ID));
    check_value(&options, CALENDAR_ID)?;
    check_value(&options, EVENT_ID)?;
    Ok(options)
}

fn non_empty(response: Value) -> Option<Value> {
    (!is_empty_response(&response)).then_some(response)
}

/// Raises a flagged exception object returned in place of a result.
fn raise_exception(function: RemoteFunction, response: Value) -> ApiResult<Value> {
    match EndpointException::from_response(&response) {
        Some(exc) => {
            warn!(%function, code = %exc.code, "remote returned an exception: {}", exc.message);
            Err(ApiError::Endpoint(exc))
        }
        None => Ok(response),
    }
}
