//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// calbridge - Calendar API calls from the command line
#[derive(Debug, Parser)]
#[command(name = "calbridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALBRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log output format (overrides the config file)
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Google access token (overrides the config file)
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

/// Available commands.
///
/// Identifier arguments accept either a plain id or a JSON options object,
/// in which case the object replaces the options.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find a calendar by id
    FindOneCalendar {
        calendar_id: String,
        /// Extra options as a JSON object
        #[arg(long)]
        options: Option<String>,
    },

    /// List calendars
    FindCalendars {
        /// Query parameters as a JSON object
        #[arg(long)]
        params: Option<String>,
    },

    /// Create a calendar
    CreateCalendar {
        /// Calendar as a JSON object
        calendar: Option<String>,
    },

    /// Update a calendar
    UpdateCalendar {
        calendar_id: String,
        /// Calendar as a JSON object
        calendar: Option<String>,
    },

    /// Delete a calendar (primary calendars are cleared)
    DeleteCalendar {
        calendar_id: String,
        #[arg(long)]
        options: Option<String>,
    },

    /// Find an event by id
    FindOneEvent {
        calendar_id: String,
        event_id: String,
        #[arg(long)]
        options: Option<String>,
    },

    /// List events of a calendar
    FindEvents {
        calendar_id: String,
        #[arg(long)]
        params: Option<String>,
    },

    /// Create an event
    CreateEvent {
        calendar_id: String,
        /// Event as a JSON object
        event: Option<String>,
    },

    /// Update an event
    UpdateEvent {
        calendar_id: String,
        event_id: String,
        /// Event as a JSON object
        event: Option<String>,
    },

    /// Delete an event
    DeleteEvent {
        calendar_id: String,
        event_id: String,
        #[arg(long)]
        options: Option<String>,
    },

    /// Send a raw Calendar API request
    Http {
        #[arg(value_enum)]
        verb: HttpVerb,
        /// Path relative to the API base, absolute URL, or JSON options
        url: String,
        /// Body or `{path, params, body}` options as JSON
        body: Option<String>,
    },

    /// Call a legacy function
    Old {
        /// Legacy function name (e.g. getEvents, syncEvents)
        function: String,
        /// Options as a JSON object
        options: Option<String>,
    },

    /// Convert dates to and from Google formats
    Convert {
        #[arg(value_enum)]
        conversion: Conversion,
        /// Epoch milliseconds or date text
        value: String,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// HTTP verbs of the generic request commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// Date conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Conversion {
    ToDateTime,
    ToDate,
    FromDateTime,
    FromDate,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
