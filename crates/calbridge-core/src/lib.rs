//! Core types: call options, endpoint exceptions, date conversions, tracing
//!
//! Everything in this crate is transport-agnostic. The remote primitives live
//! in `calbridge-providers`; the public calendar API that ties options,
//! primitives and post-processing together lives in `calbridge-client`.

pub mod convert;
pub mod exception;
pub mod options;
pub mod tracing;

pub use convert::{
    convert_event, from_google_date, from_google_date_time, to_google_date, to_google_date_time,
    ConversionError, DateInput, LegacyEvent,
};
pub use exception::{EndpointException, EXCEPTION_FLAG};
pub use options::{
    check_http_options, check_options, check_value, is_empty_response, is_truthy, CallArg,
    MissingValue, Options, BODY, CALENDAR_ID, EVENT_ID, PARAMS, PATH,
};
pub use tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
