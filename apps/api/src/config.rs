use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; TermsChecker/1.0)";

/// Application configuration loaded from environment variables.
/// Every variable has a default; only malformed values are rejected.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_file: PathBuf,
    pub port: u16,
    pub rust_log: String,
    pub fetch_timeout: Duration,
    pub user_agent: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            data_file: std::env::var("DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data.json")),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            fetch_timeout: Duration::from_secs(
                std::env::var("FETCH_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse::<u64>()
                    .context("FETCH_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            user_agent: std::env::var("USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
        })
    }
}
