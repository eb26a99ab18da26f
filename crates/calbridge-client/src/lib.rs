//! Calendar API facade, legacy namespace, CLI and configuration
//!
//! This crate provides [`CalendarApi`], the public calendar API over any
//! [`calbridge_providers::RemoteCalls`] backend, and the `calbridge`
//! command-line interface.

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod legacy;
pub mod secret;
#[cfg(test)]
mod testing;

pub use api::CalendarApi;
pub use cli::Cli;
pub use error::{ApiError, ApiResult, ClientError, ClientResult};
pub use legacy::LegacyApi;
