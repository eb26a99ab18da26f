//! Remote primitives and their Google Calendar implementation.
//!
//! This crate provides the layer the calendar API delegates to:
//!
//! - [`RemoteCalls`] - The trait every backend implements
//! - [`RemoteFunction`] - The fixed set of named primitives
//! - [`LegacyFunction`] - Functions reachable through `_oldFunction`
//! - [`ProviderError`] - Error types for primitive operations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Google API v3  │
//! └────────┬────────┘
//!          │ GoogleTransport
//!          ▼
//! ┌─────────────────┐
//! │  GoogleRemote   │
//! └────────┬────────┘
//!          │ RemoteCalls
//!          ▼
//! ┌─────────────────┐
//! │  CalendarApi    │  (calbridge-client)
//! └─────────────────┘
//! ```

pub mod error;
#[cfg(feature = "google")]
pub mod google;
pub mod remote;

// Re-export main types at crate root
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use remote::{
    BoxFuture, ErrorRemote, LEGACY_FUNCTION_KEY, LegacyFunction, RemoteCalls, RemoteFunction,
};
