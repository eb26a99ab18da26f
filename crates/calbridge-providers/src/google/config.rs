//! Google Calendar remote configuration.

use std::time::Duration;

use crate::error::{ProviderError, ProviderResult};

/// Configuration for the Google Calendar remote.
///
/// The remote authenticates every request with a bearer access token.
/// Obtaining and refreshing that token is the caller's business.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth 2.0 access token sent as `Authorization: Bearer`.
    pub access_token: String,

    /// Base URL of the Calendar API.
    ///
    /// Relative paths passed to the generic HTTP primitives are resolved
    /// against it. Defaults to [`GoogleConfig::DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string for API requests.
    pub user_agent: String,
}

impl GoogleConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Base URL for Google Calendar API v3.
    pub const DEFAULT_BASE_URL: &'static str = "https://www.googleapis.com/calendar/v3";

    /// Creates a new Google configuration with the given access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("calbridge/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the API base URL. A trailing slash is dropped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Checks that the configuration can be used to build a client.
    pub fn validate(&self) -> ProviderResult<()> {
        if self.access_token.trim().is_empty() {
            return Err(ProviderError::configuration("access token is required"));
        }
        let base = url::Url::parse(&self.base_url).map_err(|e| {
            ProviderError::configuration(format!("invalid base URL {:?}: {}", self.base_url, e))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ProviderError::configuration(format!(
                "base URL must be http(s), got {:?}",
                base.scheme()
            )));
        }
        if self.timeout.is_zero() {
            return Err(ProviderError::configuration("timeout must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GoogleConfig::new("ya29.token");
        assert_eq!(config.base_url, GoogleConfig::DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("calbridge/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn base_url_trailing_slash_dropped() {
        let config = GoogleConfig::new("t").with_base_url("http://localhost:8080/calendar/v3/");
        assert_eq!(config.base_url, "http://localhost:8080/calendar/v3");
    }

    #[test]
    fn empty_token_is_invalid() {
        let err = GoogleConfig::new("  ").validate().unwrap_err();
        assert!(err.message().contains("access token"));
    }

    #[test]
    fn bad_base_url_is_invalid() {
        assert!(GoogleConfig::new("t").with_base_url("not a url").validate().is_err());
        assert!(
            GoogleConfig::new("t")
                .with_base_url("ftp://example.com")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let config = GoogleConfig::new("t").with_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
