//! Tracing setup for calbridge
//!
//! The facade, the remote primitives and the CLI all log through `tracing`.
//! Events go to stderr; stdout is reserved for command output.
//!
//! ```ignore
//! use calbridge_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::cli(false))?;
//! ```

use std::str::FromStr;

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set global subscriber
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Failed to parse env filter directive
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),

    /// Unknown log format name
    #[error("unknown log format `{0}` (expected pretty, compact or json)")]
    UnknownFormat(String),
}

/// Output format for tracing logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    Pretty,
    /// Single-line events (default)
    #[default]
    Compact,
    /// JSON lines, for log collectors
    Json,
}

impl FromStr for TracingOutputFormat {
    type Err = TracingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(TracingError::UnknownFormat(s.to_string())),
        }
    }
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for the calbridge crates when neither `filter` nor `RUST_LOG`
    /// is set
    pub level: Level,
    pub format: TracingOutputFormat,
    /// Filter directive, overrides `level` and `RUST_LOG`
    pub filter: Option<String>,
    /// Adds file and line to every event and drops timestamps
    pub verbose: bool,
}

impl TracingConfig {
    /// Config for the command line: warnings only, or everything down to
    /// debug with source locations when `debug` is set.
    #[must_use]
    pub fn cli(debug: bool) -> Self {
        Self {
            level: if debug { Level::DEBUG } else { Level::WARN },
            format: TracingOutputFormat::Compact,
            filter: None,
            verbose: debug,
        }
    }

    /// Set the output format
    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set a custom filter directive
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    fn env_filter(&self) -> Result<EnvFilter, TracingError> {
        match self.filter {
            Some(ref filter) => Ok(EnvFilter::try_new(filter)?),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive(self.level)))),
        }
    }
}

/// Initialize tracing with the given configuration.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set or if
/// the filter directive is invalid.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = config.env_filter()?;

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.verbose)
        .with_line_number(config.verbose)
        .with_target(true);
    let layer = match config.format {
        TracingOutputFormat::Pretty => layer.pretty().boxed(),
        TracingOutputFormat::Json => layer.json().boxed(),
        TracingOutputFormat::Compact if config.verbose => layer.compact().without_time().boxed(),
        TracingOutputFormat::Compact => layer.compact().boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(env_filter).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Builds the filter directive enabling `level` for every calbridge crate.
fn default_directive(level: Level) -> String {
    CRATE_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Log targets of the workspace crates.
const CRATE_TARGETS: [&str; 4] = [
    "calbridge",
    "calbridge_core",
    "calbridge_providers",
    "calbridge_client",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_config_levels() {
        let quiet = TracingConfig::cli(false);
        assert_eq!(quiet.level, Level::WARN);
        assert_eq!(quiet.format, TracingOutputFormat::Compact);
        assert!(!quiet.verbose);

        let debug = TracingConfig::cli(true);
        assert_eq!(debug.level, Level::DEBUG);
        assert!(debug.verbose);
    }

    #[test]
    fn builder_methods() {
        let config = TracingConfig::cli(false)
            .with_format(TracingOutputFormat::Json)
            .with_filter("calbridge_client=trace");

        assert_eq!(config.format, TracingOutputFormat::Json);
        assert_eq!(config.filter.as_deref(), Some("calbridge_client=trace"));
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("json".parse::<TracingOutputFormat>().unwrap(), TracingOutputFormat::Json);
        assert_eq!(" Pretty ".parse::<TracingOutputFormat>().unwrap(), TracingOutputFormat::Pretty);
        assert!(matches!(
            "xml".parse::<TracingOutputFormat>(),
            Err(TracingError::UnknownFormat(name)) if name == "xml"
        ));
    }

    #[test]
    fn invalid_filter_is_rejected() {
        let config = TracingConfig::cli(false).with_filter("calbridge=loud");
        assert!(matches!(config.env_filter(), Err(TracingError::EnvFilter(_))));
    }

    #[test]
    fn default_directive_covers_all_crates() {
        let directive = default_directive(Level::DEBUG);
        assert_eq!(
            directive,
            "calbridge=DEBUG,calbridge_core=DEBUG,calbridge_providers=DEBUG,calbridge_client=DEBUG"
        );
        assert!(EnvFilter::try_new(&directive).is_ok());
    }
}
