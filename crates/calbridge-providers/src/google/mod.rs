//! Google Calendar remote implementation.
//!
//! This module provides a [`GoogleRemote`] that implements every remote
//! primitive against the Google Calendar API v3.
//!
//! # Features
//!
//! - Bearer token authentication (the token is supplied by configuration)
//! - Calendar and event CRUD, including the lookup-then-delete contract
//! - Generic HTTP requests relative to the API base URL
//! - The legacy `_oldFunction` API, including paged incremental sync
//!
//! # Example
//!
//! ```ignore
//! use calbridge_providers::google::{GoogleConfig, GoogleRemote};
//! use calbridge_providers::{RemoteCalls, RemoteFunction};
//!
//! let remote = GoogleRemote::new(&GoogleConfig::new(access_token))?;
//! let calendars = remote.call(RemoteFunction::FindCalendars, Options::new()).await?;
//! ```

mod client;
mod config;
mod legacy;
mod remote;
#[cfg(test)]
mod testing;

pub use client::{ApiRequest, GoogleCalendarClient, GoogleTransport};
pub use config::GoogleConfig;
pub use remote::GoogleRemote;
