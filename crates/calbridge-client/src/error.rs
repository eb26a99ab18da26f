//! Client error types.

use std::fmt;

use calbridge_core::{ConversionError, EndpointException, MissingValue};

use crate::secret::SecretError;

/// Result type for calendar API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors raised by the calendar API.
#[derive(Debug)]
pub enum ApiError {
    /// A required identifier was missing after normalization.
    EmptyValue(String),
    /// A remote primitive failed, or returned an exception object.
    Endpoint(EndpointException),
    /// A date could not be converted.
    Conversion(ConversionError),
}

impl ApiError {
    /// Returns the endpoint exception, if this error carries one.
    pub fn exception(&self) -> Option<&EndpointException> {
        match self {
            Self::Endpoint(exc) => Some(exc),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue(key) => write!(f, "Empty {}", key),
            Self::Endpoint(exc) => write!(f, "{}", exc),
            Self::Conversion(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EmptyValue(_) => None,
            Self::Endpoint(exc) => Some(exc),
            Self::Conversion(err) => Some(err),
        }
    }
}

impl From<MissingValue> for ApiError {
    fn from(err: MissingValue) -> Self {
        Self::EmptyValue(err.key)
    }
}

impl From<EndpointException> for ApiError {
    fn from(exc: EndpointException) -> Self {
        Self::Endpoint(exc)
    }
}

impl From<ConversionError> for ApiError {
    fn from(err: ConversionError) -> Self {
        Self::Conversion(err)
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// The access token could not be obtained.
    Secret(SecretError),
    /// Calendar API error.
    Api(ApiError),
    /// Invalid command-line input.
    Usage(String),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Secret(err) => write!(f, "access token error: {}", err),
            Self::Api(err) => write!(f, "{}", err),
            Self::Usage(msg) => write!(f, "invalid input: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(err) => Some(err),
            Self::Secret(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<SecretError> for ClientError {
    fn from(err: SecretError) -> Self {
        Self::Secret(err)
    }
}

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_display() {
        let err = ApiError::from(MissingValue {
            key: "calendarId".to_string(),
        });
        assert_eq!(err.to_string(), "Empty calendarId");
        assert!(err.exception().is_none());
    }

    #[test]
    fn endpoint_display_and_source() {
        let exc = EndpointException::new("not_found", "Not Found").with_function("_findOneEvent");
        let err = ApiError::from(exc);
        assert_eq!(err.to_string(), "[_findOneEvent] not_found: Not Found");
        assert_eq!(err.exception().unwrap().code, "not_found");

        let client = ClientError::from(err);
        assert!(std::error::Error::source(&client).is_some());
    }

    #[test]
    fn secret_error_keeps_cause() {
        let err = ClientError::from(SecretError::EnvUnset {
            var: "GOOGLE_TOKEN".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "access token error: environment variable `GOOGLE_TOKEN` is not set"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
