//! TOML schema for config.toml.
//!
//! ```toml
//! database_url = "sqlite:///home/me/.local/share/devshelf/shelf.db"
//! host = "127.0.0.1"
//! port = 3030
//! server_url = "http://127.0.0.1:3030"
//! log_format = "compact"  # or "json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, Result};

/// Log line formatting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human-readable output (default)
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Some(LogFormat::Compact),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings stored in config.toml. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DevshelfConfig {
    /// Document store connection string
    pub database_url: Option<String>,

    /// Address the server binds to
    pub host: Option<String>,

    /// Port the server listens on
    pub port: Option<u16>,

    /// Server the client commands talk to
    pub server_url: Option<String>,

    /// Log line format
    pub log_format: Option<LogFormat>,
}

impl DevshelfConfig {
    /// Parse a config document.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a config file; a missing file yields `None`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(text) => toml::from_str::<Self>(&text)
                .map(Some)
                .map_err(|e| Error::Config(format!("{}: {}", path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
