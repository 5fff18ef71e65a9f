//! Precedence resolution for settings.
//!
//! Precedence (highest to lowest):
//!
//! 1. CLI flags (passed at runtime)
//! 2. `DEVSHELF_*` environment variables
//! 3. config.toml (`$DEVSHELF_CONFIG` or `~/.config/devshelf/config.toml`)
//! 4. Built-in defaults

use std::path::PathBuf;

use super::schema::{DevshelfConfig, LogFormat};
use crate::client::DEFAULT_SERVER_URL;
use crate::server::DEFAULT_PORT;
use crate::storage::{DATABASE_URL_ENV, DatabaseUrl};
use crate::{Error, Result};

pub const CONFIG_PATH_ENV: &str = "DEVSHELF_CONFIG";
pub const HOST_ENV: &str = "DEVSHELF_HOST";
pub const PORT_ENV: &str = "DEVSHELF_PORT";
pub const SERVER_ENV: &str = "DEVSHELF_SERVER";
pub const LOG_FORMAT_ENV: &str = "DEVSHELF_LOG_FORMAT";

pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from environment variable
    EnvVar(String),
    /// Value from a config file
    File(PathBuf),
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::File(path) => write!(f, "file:{}", path.display()),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub server_url: Option<String>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }
}

/// Fully resolved settings with source tracking.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Unset unless some layer provides one
    pub database_url: Option<Resolved<DatabaseUrl>>,
    pub host: Resolved<String>,
    pub port: Resolved<u16>,
    pub server_url: Resolved<String>,
    pub log_format: Resolved<LogFormat>,
    /// Config file that was read, if any
    pub config_file: Option<PathBuf>,
}

impl Settings {
    /// The database URL, or a configuration error naming how to set it.
    pub fn require_database_url(&self) -> Result<DatabaseUrl> {
        self.database_url
            .as_ref()
            .map(|r| r.value.clone())
            .ok_or_else(|| {
                Error::Config(format!(
                    "No database URL configured. Set {} or pass --database-url.",
                    DATABASE_URL_ENV
                ))
            })
    }
}

/// Default config file location.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("devshelf").join("config.toml"))
}

/// Resolve settings from the process environment and the config file.
pub fn resolve(overrides: &ConfigOverrides) -> Result<Settings> {
    resolve_with(overrides, |name| std::env::var(name).ok())
}

/// Resolve settings with an explicit environment lookup.
pub fn resolve_with<F>(overrides: &ConfigOverrides, env: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let env = |name: &str| env(name).filter(|v| !v.trim().is_empty());

    let config_path = env(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .or_else(default_config_path);
    let (file, config_file) = match config_path {
        Some(path) => match DevshelfConfig::load(&path)? {
            Some(config) => (config, Some(path)),
            None => (DevshelfConfig::default(), None),
        },
        None => (DevshelfConfig::default(), None),
    };
    let file_source = || match &config_file {
        Some(path) => ValueSource::File(path.clone()),
        None => ValueSource::Default,
    };

    let database_url = if let Some(ref url) = overrides.database_url {
        Some(Resolved::new(url.parse::<DatabaseUrl>()?, ValueSource::CliFlag))
    } else if let Some(url) = env(DATABASE_URL_ENV) {
        Some(Resolved::new(url.parse::<DatabaseUrl>()?, env_source(DATABASE_URL_ENV)))
    } else if let Some(ref url) = file.database_url {
        Some(Resolved::new(url.parse::<DatabaseUrl>()?, file_source()))
    } else {
        None
    };

    let host = if let Some(ref host) = overrides.host {
        Resolved::new(host.clone(), ValueSource::CliFlag)
    } else if let Some(host) = env(HOST_ENV) {
        Resolved::new(host, env_source(HOST_ENV))
    } else if let Some(ref host) = file.host {
        Resolved::new(host.clone(), file_source())
    } else {
        Resolved::new(DEFAULT_HOST.to_string(), ValueSource::Default)
    };

    let port = if let Some(port) = overrides.port {
        Resolved::new(port, ValueSource::CliFlag)
    } else if let Some(port) = env(PORT_ENV) {
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| Error::Config(format!("{} must be a port number, got '{}'", PORT_ENV, port)))?;
        Resolved::new(port, env_source(PORT_ENV))
    } else if let Some(port) = file.port {
        Resolved::new(port, file_source())
    } else {
        Resolved::new(DEFAULT_PORT, ValueSource::Default)
    };

    let server_url = if let Some(ref url) = overrides.server_url {
        Resolved::new(url.clone(), ValueSource::CliFlag)
    } else if let Some(url) = env(SERVER_ENV) {
        Resolved::new(url, env_source(SERVER_ENV))
    } else if let Some(ref url) = file.server_url {
        Resolved::new(url.clone(), file_source())
    } else {
        Resolved::new(DEFAULT_SERVER_URL.to_string(), ValueSource::Default)
    };

    let log_format = if let Some(format) = env(LOG_FORMAT_ENV) {
        let parsed = LogFormat::parse(&format).ok_or_else(|| {
            Error::Config(format!(
                "{} must be 'compact' or 'json', got '{}'",
                LOG_FORMAT_ENV, format
            ))
        })?;
        Resolved::new(parsed, env_source(LOG_FORMAT_ENV))
    } else if let Some(format) = file.log_format {
        Resolved::new(format, file_source())
    } else {
        Resolved::new(LogFormat::default(), ValueSource::Default)
    };

    Ok(Settings {
        database_url,
        host,
        port,
        server_url,
        log_format,
        config_file,
    })
}

fn env_source(name: &str) -> ValueSource {
    ValueSource::EnvVar(name.to_string())
}
