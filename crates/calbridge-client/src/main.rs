//! calbridge CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use calbridge_client::cli::{Cli, Command, ConfigAction, LogFormat};
use calbridge_client::commands;
use calbridge_client::config::ClientConfig;
use calbridge_client::error::{ClientError, ClientResult};
use calbridge_core::tracing::{TracingConfig, TracingOutputFormat, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize tracing
    if let Err(e) = init_tracing(tracing_config(&cli, &config)) {
        eprintln!("warning: failed to initialize logging: {}", e);
    }

    // Run the command
    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            if let ClientError::Api(ref api_err) = e
                && let Some(exc) = api_err.exception()
                && let Ok(json) = serde_json::to_string_pretty(&exc.to_value())
            {
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> ClientResult<ClientConfig> {
    match cli.config {
        Some(ref path) => ClientConfig::load_from(path).map_err(ClientError::Config),
        None => ClientConfig::load().map_err(ClientError::Config),
    }
}

fn tracing_config(cli: &Cli, config: &ClientConfig) -> TracingConfig {
    let mut tracing = TracingConfig::cli(cli.debug || config.debug);

    let format = match cli.log_format {
        Some(LogFormat::Pretty) => TracingOutputFormat::Pretty,
        Some(LogFormat::Compact) => TracingOutputFormat::Compact,
        Some(LogFormat::Json) => TracingOutputFormat::Json,
        None => config.logging.format.parse().unwrap_or_else(|e| {
            eprintln!("warning: {}", e);
            TracingOutputFormat::default()
        }),
    };
    tracing = tracing.with_format(format);

    if let Some(ref filter) = config.logging.filter {
        tracing = tracing.with_filter(filter);
    }
    tracing
}

async fn run(cli: Cli, config: ClientConfig) -> ClientResult<()> {
    match cli.command {
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
        command => {
            let api = commands::call::build_api(&config, cli.access_token.as_deref());
            let result = commands::call::run(&api, command).await?;
            let output =
                serde_json::to_string_pretty(&result).map_err(std::io::Error::from)?;
            println!("{}", output);
            Ok(())
        }
    }
}
