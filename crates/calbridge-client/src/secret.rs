//! Access token sources.
//!
//! The `[google] access_token` setting is either the token itself or a
//! reference to where it is kept:
//!
//! - `pass::path/in/store`: first line of `pass show path/in/store`
//! - `env::VAR_NAME`: the value of `$VAR_NAME`

use std::fmt;
use std::process::Command;

const PASS_PREFIX: &str = "pass::";
const ENV_PREFIX: &str = "env::";

/// Where an access token comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource<'a> {
    /// An entry of the `pass` password store.
    Pass(&'a str),
    /// An environment variable.
    Env(&'a str),
    /// The token itself.
    Literal(&'a str),
}

impl<'a> TokenSource<'a> {
    /// Reads a configured `access_token` value.
    pub fn parse(value: &'a str) -> Self {
        if let Some(path) = value.strip_prefix(PASS_PREFIX) {
            Self::Pass(path)
        } else if let Some(var) = value.strip_prefix(ENV_PREFIX) {
            Self::Env(var)
        } else {
            Self::Literal(value)
        }
    }

    /// True when the value points elsewhere instead of holding the token.
    pub fn is_reference(&self) -> bool {
        !matches!(self, Self::Literal(_))
    }

    /// Fetches the token. Surrounding whitespace is dropped and an empty
    /// token is an error.
    pub fn resolve(&self) -> Result<String, SecretError> {
        let token = match *self {
            Self::Pass(path) => read_pass(path)?,
            Self::Env(var) => std::env::var(var).map_err(|_| SecretError::EnvUnset {
                var: var.to_string(),
            })?,
            Self::Literal(token) => token.to_string(),
        };

        let token = token.trim();
        if token.is_empty() {
            return Err(SecretError::Empty {
                source: self.to_string(),
            });
        }
        Ok(token.to_string())
    }
}

impl fmt::Display for TokenSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass(path) => write!(f, "{}{}", PASS_PREFIX, path),
            Self::Env(var) => write!(f, "{}{}", ENV_PREFIX, var),
            Self::Literal(_) => f.write_str("access_token"),
        }
    }
}

fn read_pass(path: &str) -> Result<String, SecretError> {
    let output = Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|e| SecretError::PassSpawn {
            path: path.to_string(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(SecretError::PassFailed {
            path: path.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string())
}

/// Failure to obtain the access token.
#[derive(Debug)]
pub enum SecretError {
    /// No `access_token` configured at all.
    Missing { config_path: String },
    /// `pass` could not be started.
    PassSpawn {
        path: String,
        source: std::io::Error,
    },
    /// `pass show` exited with an error.
    PassFailed {
        path: String,
        status: String,
        stderr: String,
    },
    /// The referenced environment variable is not set.
    EnvUnset { var: String },
    /// The source produced an empty token.
    Empty { source: String },
}

impl fmt::Display for SecretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { config_path } => write!(
                f,
                "Google access token not found. Add to {}:\n  [google]\n  access_token = \"env::GOOGLE_ACCESS_TOKEN\"",
                config_path
            ),
            Self::PassSpawn { path, source } => {
                write!(f, "failed to run `pass show {}`: {}", path, source)
            }
            Self::PassFailed {
                path,
                status,
                stderr,
            } => write!(f, "`pass show {}` failed ({}): {}", path, status, stderr),
            Self::EnvUnset { var } => write!(f, "environment variable `{}` is not set", var),
            Self::Empty { source } => write!(f, "{} resolved to an empty token", source),
        }
    }
}

impl std::error::Error for SecretError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PassSpawn { source, .. } => Some(source),
            _ => None,
        }
    }
}
