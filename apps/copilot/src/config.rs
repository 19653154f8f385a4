use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::backend;
use crate::pipeline::tailoring::TailorMode;
use crate::reasoning;
use crate::session::identity;

const DEFAULT_STORAGE_URL: &str = "sqlite://copilot.db?mode=rwc";

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_api_url: String,
    pub reasoning_api_base: String,
    pub reasoning_model: String,
    pub reasoning_timeout: Duration,
    pub backend_timeout: Duration,
    pub identity_revoke_url: String,
    pub storage_url: String,
    pub tailor_mode: TailorMode,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            backend_api_url: var("BACKEND_API_URL", backend::DEFAULT_API_URL),
            reasoning_api_base: var("REASONING_API_BASE", reasoning::DEFAULT_API_BASE),
            reasoning_model: var("REASONING_MODEL", reasoning::DEFAULT_MODEL),
            reasoning_timeout: Duration::from_secs(parse_var(&lookup, "REASONING_TIMEOUT_SECS", 120)?),
            backend_timeout: Duration::from_secs(parse_var(&lookup, "BACKEND_TIMEOUT_SECS", 30)?),
            identity_revoke_url: var("IDENTITY_REVOKE_URL", identity::DEFAULT_REVOKE_URL),
            storage_url: var("STORAGE_URL", DEFAULT_STORAGE_URL),
            tailor_mode: parse_var(&lookup, "TAILOR_MODE", TailorMode::Backend)?,
            port: parse_var(&lookup, "PORT", 8787)?,
            rust_log: var("RUST_LOG", "info"),
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("Environment variable '{key}' is invalid: {e}")),
        None => Ok(default),
    }
}
