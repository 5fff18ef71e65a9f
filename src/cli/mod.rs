//! CLI argument definitions for devshelf.

use clap::{Parser, Subcommand};

use crate::client::CategoryFilter;
use crate::config::ConfigOverrides;
use crate::models::EntityKind;

/// Version string with build metadata.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("DEVSHELF_GIT_COMMIT"),
    " built ",
    env!("DEVSHELF_BUILD_TIMESTAMP"),
    ")"
);

/// Devshelf - a personal shelf of developer odds and ends.
///
/// Run `devshelf serve` to start the API, then use the other commands to
/// manage key-values, projects, commands, notes and websites.
#[derive(Parser, Debug)]
#[command(name = "devshelf")]
#[command(author, version = LONG_VERSION, about = "A personal shelf of key-values, projects, commands, notes and websites", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Server URL for client commands (default: http://127.0.0.1:3030).
    /// Can also be set via DEVSHELF_SERVER.
    #[arg(long = "server", global = true, value_name = "URL")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Settings given on the command line, layered over env and file.
    pub fn config_overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(server) = &self.server {
            overrides = overrides.with_server_url(server.as_str());
        }
        if let Commands::Serve {
            host,
            port,
            database_url,
        } = &self.command
        {
            if let Some(host) = host {
                overrides = overrides.with_host(host.as_str());
            }
            if let Some(port) = port {
                overrides = overrides.with_port(*port);
            }
            if let Some(url) = database_url {
                overrides = overrides.with_database_url(url.as_str());
            }
        }
        overrides
    }
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the REST API server until Ctrl+C
    Serve {
        /// Address to bind (default: 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default: 3030)
        #[arg(short, long)]
        port: Option<u16>,

        /// Document store connection string, e.g. sqlite:///path/to/shelf.db.
        /// Can also be set via DEVSHELF_DATABASE_URL.
        #[arg(long, value_name = "URL")]
        database_url: Option<String>,
    },

    /// List a collection, optionally searched, filtered and sorted
    List {
        /// Collection: key-value, project, command, note or website
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,

        /// Case-insensitive substring to match against the record's text fields
        #[arg(short, long)]
        search: Option<String>,

        /// Sort key (e.g. title, created-at, url-count)
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending instead of ascending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Website category: All, AI, "AI Agent" or Deployed
        #[arg(long, value_parser = parse_category)]
        category: Option<CategoryFilter>,
    },

    /// Show one record
    Show {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,

        /// Record ID
        id: String,
    },

    /// Create a record
    Add {
        #[command(subcommand)]
        entity: EntityArgs,
    },

    /// Replace all fields of a record
    Edit {
        /// Record ID
        id: String,

        #[command(subcommand)]
        entity: EntityArgs,
    },

    /// Delete a record
    Rm {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,

        /// Record ID
        id: String,
    },

    /// Show counts across key-values, projects, commands and notes
    Stats,
}

/// Field values for `add` and `edit`.
#[derive(Subcommand, Debug, Clone)]
pub enum EntityArgs {
    /// A uniquely keyed value
    #[command(name = "key-value", alias = "kv")]
    KeyValue { key: String, value: String },

    /// A named project with one or more URLs
    Project {
        name: String,

        /// Project URLs; blank entries are dropped
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// A titled shell command
    Command { title: String, command: String },

    /// A titled note
    Note { title: String, content: String },

    /// A bookmarked website
    Website {
        title: String,
        url: String,

        /// One of: AI, "AI Agent", Deployed
        #[arg(short, long)]
        category: String,
    },
}

impl EntityArgs {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityArgs::KeyValue { .. } => EntityKind::KeyValue,
            EntityArgs::Project { .. } => EntityKind::Project,
            EntityArgs::Command { .. } => EntityKind::Command,
            EntityArgs::Note { .. } => EntityKind::Note,
            EntityArgs::Website { .. } => EntityKind::Website,
        }
    }
}

fn parse_entity(s: &str) -> Result<EntityKind, String> {
    s.parse().map_err(|e: crate::Error| e.to_string())
}

fn parse_category(s: &str) -> Result<CategoryFilter, String> {
    s.parse().map_err(|e: crate::Error| e.to_string())
}
