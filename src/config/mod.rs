//! Configuration for devshelf.
//!
//! Settings come from CLI flags, `DEVSHELF_*` environment variables and an
//! optional TOML file:
//!
//! - `$DEVSHELF_CONFIG`, or
//! - `~/.config/devshelf/config.toml` (platform config dir)
//!
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    CONFIG_PATH_ENV, ConfigOverrides, DEFAULT_HOST, HOST_ENV, LOG_FORMAT_ENV, PORT_ENV, Resolved,
    SERVER_ENV, Settings, ValueSource, default_config_path, resolve, resolve_with,
};
pub use schema::{DevshelfConfig, LogFormat};
