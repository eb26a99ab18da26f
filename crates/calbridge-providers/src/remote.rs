//! Remote primitive trait definition.
//!
//! The public calendar API never talks to a backend directly. After folding
//! its arguments into [`Options`] it delegates to one of a fixed set of
//! named primitives through the [`RemoteCalls`] trait, and post-processes
//! whatever comes back.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use calbridge_core::Options;
use serde_json::Value;

use crate::error::{ProviderError, ProviderResult};

/// A boxed future for async trait methods.
///
/// This is used because async functions in traits are not yet stable in a way
/// that works well with dynamic dispatch. Using boxed futures allows the trait
/// to be object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The named remote primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteFunction {
    FindOneCalendar,
    FindCalendars,
    CreateCalendar,
    UpdateCalendar,
    DeleteCalendar,
    FindOneEvent,
    FindEvents,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
    GetRequest,
    PostRequest,
    PutRequest,
    PatchRequest,
    DeleteRequest,
    /// Entry point of the legacy API; the concrete legacy function is named
    /// by the `__functionName` option.
    OldFunction,
}

impl RemoteFunction {
    /// Returns the wire name of the primitive.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FindOneCalendar => "_findOneCalendar",
            Self::FindCalendars => "_findCalendars",
            Self::CreateCalendar => "_createCalendar",
            Self::UpdateCalendar => "_updateCalendar",
            Self::DeleteCalendar => "_deleteCalendar",
            Self::FindOneEvent => "_findOneEvent",
            Self::FindEvents => "_findEvents",
            Self::CreateEvent => "_createEvent",
            Self::UpdateEvent => "_updateEvent",
            Self::DeleteEvent => "_deleteEvent",
            Self::GetRequest => "_getRequest",
            Self::PostRequest => "_postRequest",
            Self::PutRequest => "_putRequest",
            Self::PatchRequest => "_patchRequest",
            Self::DeleteRequest => "_deleteRequest",
            Self::OldFunction => "_oldFunction",
        }
    }
}

impl fmt::Display for RemoteFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Option naming the legacy function carried by `_oldFunction`.
pub const LEGACY_FUNCTION_KEY: &str = "__functionName";

/// Functions of the legacy API, all routed through `_oldFunction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegacyFunction {
    GetCalendars,
    CreateCalendar,
    UpdateCalendar,
    RemoveCalendar,
    ClearCalendar,
    GetEvents,
    SyncEvents,
    CreateEvent,
    UpdateEvent,
    RemoveEvent,
}

impl LegacyFunction {
    /// Every legacy function.
    pub const ALL: [LegacyFunction; 10] = [
        Self::GetCalendars,
        Self::CreateCalendar,
        Self::UpdateCalendar,
        Self::RemoveCalendar,
        Self::ClearCalendar,
        Self::GetEvents,
        Self::SyncEvents,
        Self::CreateEvent,
        Self::UpdateEvent,
        Self::RemoveEvent,
    ];

    /// Returns the name sent under [`LEGACY_FUNCTION_KEY`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetCalendars => "getCalendars",
            Self::CreateCalendar => "createCalendar",
            Self::UpdateCalendar => "updateCalendar",
            Self::RemoveCalendar => "removeCalendar",
            Self::ClearCalendar => "clearCalendar",
            Self::GetEvents => "getEvents",
            Self::SyncEvents => "syncEvents",
            Self::CreateEvent => "createEvent",
            Self::UpdateEvent => "updateEvent",
            Self::RemoveEvent => "removeEvent",
        }
    }

    /// Looks a legacy function up by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.as_str() == name)
    }

    /// Name under which failures of this function are reported.
    pub fn qualified_name(&self) -> String {
        format!("old.{}", self.as_str())
    }
}

impl fmt::Display for LegacyFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The remote-call primitive behind the calendar API.
///
/// Implementations receive fully normalized options and return the raw JSON
/// result. A primitive may report failure either by returning an error or,
/// for deletions, by returning a flagged exception object as its result;
/// callers are expected to handle both.
///
/// # Example Implementation
///
/// ```ignore
/// struct StaticRemote;
///
/// impl RemoteCalls for StaticRemote {
///     fn name(&self) -> &str { "static" }
///
///     fn call(&self, function: RemoteFunction, options: Options) -> BoxFuture<'_, ProviderResult<Value>> {
///         Box::pin(async move { Ok(Value::Object(options)) })
///     }
/// }
/// ```
pub trait RemoteCalls: Send + Sync {
    /// Returns the name of the backend (e.g., "google").
    fn name(&self) -> &str;

    /// Executes a primitive.
    fn call(
        &self,
        function: RemoteFunction,
        options: Options,
    ) -> BoxFuture<'_, ProviderResult<Value>>;
}

impl<T: RemoteCalls + ?Sized> RemoteCalls for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn call(
        &self,
        function: RemoteFunction,
        options: Options,
    ) -> BoxFuture<'_, ProviderResult<Value>> {
        (**self).call(function, options)
    }
}

/// A remote that fails every call with the same error.
///
/// Used when the backend could not be configured, so the failure surfaces
/// at call time with the primitive name attached.
#[derive(Debug)]
pub struct ErrorRemote {
    name: String,
    error: ProviderError,
}

impl ErrorRemote {
    /// Creates a new error remote.
    pub fn new(name: impl Into<String>, error: ProviderError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }
}

impl RemoteCalls for ErrorRemote {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(
        &self,
        _function: RemoteFunction,
        _options: Options,
    ) -> BoxFuture<'_, ProviderResult<Value>> {
        let error =
            ProviderError::new(self.error.code(), self.error.message()).with_provider(&self.name);
        Box::pin(async move { Err(error) })
    }
}
