//! Configuration commands.

use crate::config::ClientConfig;
use crate::secret::TokenSource;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
///
/// The access token is masked.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    let mut shown = config.clone();
    #[cfg(feature = "google")]
    if let Some(ref mut google) = shown.google {
        if let Some(ref token) = google.access_token {
            google.access_token = Some(mask_secret(token));
        }
    }

    let toml_str = toml::to_string_pretty(&shown)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", ClientConfig::default_path().display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    #[cfg(feature = "google")]
    match config.google {
        Some(ref google) => {
            google.to_remote_config()?;
            println!("Google settings are valid.");
        }
        None => {
            return Err(ClientError::Config(
                "no [google] section in config.toml".to_string(),
            ));
        }
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> ClientResult<()> {
    let config_path = ClientConfig::default_path();
    println!("config: {}", config_path.display());
    Ok(())
}

/// Secret references are shown as-is; literal tokens are masked.
fn mask_secret(value: &str) -> String {
    if TokenSource::parse(value).is_reference() {
        value.to_string()
    } else {
        "********".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_references_stay_visible() {
        assert_eq!(mask_secret("env::GOOGLE_ACCESS_TOKEN"), "env::GOOGLE_ACCESS_TOKEN");
        assert_eq!(mask_secret("pass::google/calendar"), "pass::google/calendar");
        assert_eq!(mask_secret("ya29.secret"), "********");
    }

    #[cfg(feature = "google")]
    #[test]
    fn validate_requires_google_section() {
        assert!(validate(&ClientConfig::default()).is_err());
    }
}
