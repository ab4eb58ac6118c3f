//! Runtime configuration, resolved once at startup
//!
//! Each setting is taken from its command-line flag, then its environment
//! variable, then the built-in default.

use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;

use crate::cli::Cli;

pub const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const ENV_BACKEND: &str = "TODOBOARD_BACKEND";
pub const ENV_API_KEY: &str = "TODOBOARD_API_KEY";
pub const ENV_AUTH_URL: &str = "TODOBOARD_AUTH_URL";
pub const ENV_TIMEOUT_MS: &str = "TODOBOARD_TIMEOUT_MS";

/// Which identity service implementation to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    Rest,
    #[default]
    Memory,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rest" => Ok(Backend::Rest),
            "memory" | "local" => Ok(Backend::Memory),
            other => bail!("unknown identity backend '{}' (expected 'rest' or 'memory')", other),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Rest => write!(f, "rest"),
            Backend::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend: Backend,
    pub api_key: Option<String>,
    pub auth_url: String,
    pub timeout_ms: u64,
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            api_key: None,
            auth_url: DEFAULT_AUTH_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            log_level: None,
        }
    }
}

impl Config {
    /// Resolve from parsed flags and the process environment
    pub fn load(cli: &Cli) -> Result<Self> {
        Self::resolve(cli, |key| std::env::var(key).ok())
    }

    /// Resolve from parsed flags and an arbitrary environment lookup
    pub fn resolve<F>(cli: &Cli, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let api_key = cli.api_key.clone().or_else(|| env(ENV_API_KEY));

        let backend = match cli.backend.clone().or_else(|| env(ENV_BACKEND)) {
            Some(name) => name.parse()?,
            None if api_key.is_some() => Backend::Rest,
            None => Backend::Memory,
        };

        let auth_url = cli
            .auth_url
            .clone()
            .or_else(|| env(ENV_AUTH_URL))
            .unwrap_or_else(|| DEFAULT_AUTH_URL.to_string());

        let timeout_ms = match cli.timeout_ms {
            Some(ms) => ms,
            None => match env(ENV_TIMEOUT_MS) {
                Some(raw) => match raw.trim().parse() {
                    Ok(ms) => ms,
                    Err(_) => bail!("{} must be a number of milliseconds, got '{}'", ENV_TIMEOUT_MS, raw),
                },
                None => DEFAULT_TIMEOUT_MS,
            },
        };

        let config = Config {
            backend,
            api_key,
            auth_url,
            timeout_ms,
            log_level: cli.log_level.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Fail fast before the terminal is taken over
    pub fn validate(&self) -> Result<()> {
        if self.backend == Backend::Rest && self.api_key.is_none() {
            bail!(
                "the rest identity backend needs an API key. Pass --api-key or set {}.",
                ENV_API_KEY
            );
        }
        if self.timeout_ms == 0 {
            bail!("timeout must be greater than zero");
        }
        Ok(())
    }
}
