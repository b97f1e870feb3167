//! Central module for application-wide configuration settings.
//!
//! This module handles loading the API location, the session file path and
//! transport settings from the environment (optionally seeded by a `.env` file).

use anyhow::{Context, Result};
use expanduser::expanduser;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_SESSION_FILE: &str = "~/.tooff/session.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub session_file: PathBuf,
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_url = env::var("TOOFF_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let session_file = env::var("TOOFF_SESSION_FILE")
            .unwrap_or_else(|_| DEFAULT_SESSION_FILE.to_string());
        let session_file = expand_path(&session_file)?;

        let request_timeout = match env::var("TOOFF_REQUEST_TIMEOUT_SECONDS") {
            Ok(value) => Some(Duration::from_secs(
                value
                    .parse::<u64>()
                    .context("TOOFF_REQUEST_TIMEOUT_SECONDS must be a valid number")?,
            )),
            Err(_) => None,
        };

        Ok(Config {
            api_url: normalize_api_url(&api_url),
            session_file,
            request_timeout,
        })
    }

    /// Applies command-line overrides on top of the environment.
    pub fn with_overrides(
        mut self,
        api_url: Option<String>,
        session_file: Option<String>,
    ) -> Result<Self> {
        if let Some(api_url) = api_url {
            self.api_url = normalize_api_url(&api_url);
        }
        if let Some(session_file) = session_file {
            self.session_file = expand_path(&session_file)?;
        }
        Ok(self)
    }
}

fn expand_path(path: &str) -> Result<PathBuf> {
    expanduser(path).with_context(|| format!("Invalid session file path: {}", path))
}

fn normalize_api_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slashes_are_trimmed() {
        assert_eq!(
            normalize_api_url("https://tooff.example.com/api/"),
            "https://tooff.example.com/api"
        );
        assert_eq!(normalize_api_url(DEFAULT_API_URL), DEFAULT_API_URL);
    }

    #[test]
    fn test_overrides_replace_env_values() {
        let config = Config {
            api_url: DEFAULT_API_URL.to_string(),
            session_file: PathBuf::from("/tmp/a.json"),
            request_timeout: None,
        }
        .with_overrides(
            Some("http://10.0.0.5:9000/api/".to_string()),
            Some("/tmp/b.json".to_string()),
        )
        .unwrap();

        assert_eq!(config.api_url, "http://10.0.0.5:9000/api");
        assert_eq!(config.session_file, PathBuf::from("/tmp/b.json"));
    }
}
