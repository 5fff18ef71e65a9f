//! Data models for devshelf entities.
//!
//! This module defines the five record kinds kept on the shelf:
//! - `KeyValue` - A uniquely keyed string value
//! - `Project` - A uniquely named project with its list of URLs
//! - `Command` - A titled shell command
//! - `Note` - A titled free-text note
//! - `Website` - A uniquely titled bookmark with a category
//!
//! Each kind is stored as a [`Record`], which wraps the entity's fields with
//! the server-assigned identifier and timestamps.

pub mod draft;

pub use draft::{CommandDraft, KeyValueDraft, NoteDraft, ProjectDraft, WebsiteDraft};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// The five kinds of records kept on the shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    KeyValue,
    Project,
    Command,
    Note,
    Website,
}

impl EntityKind {
    /// Every kind, in display order.
    pub const ALL: [EntityKind; 5] = [
        Self::KeyValue,
        Self::Project,
        Self::Command,
        Self::Note,
        Self::Website,
    ];

    /// Collection name, used for the storage table and the `/api/<collection>` path.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::KeyValue => "keyvalues",
            Self::Project => "projects",
            Self::Command => "commands",
            Self::Note => "notes",
            Self::Website => "websites",
        }
    }

    /// Name used in "not found" and "deleted" messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::KeyValue => "KeyValue",
            Self::Project => "Project",
            Self::Command => "Command",
            Self::Note => "Note",
            Self::Website => "Website",
        }
    }

    /// Lowercase plural used in human-facing list messages.
    pub fn plural_label(&self) -> &'static str {
        match self {
            Self::KeyValue => "key-value pairs",
            Self::Project => "projects",
            Self::Command => "commands",
            Self::Note => "notes",
            Self::Website => "websites",
        }
    }

    /// Message returned when a required field is missing or blank.
    pub fn required_message(&self) -> &'static str {
        match self {
            Self::KeyValue => "Key and value are required",
            Self::Project => "Name and at least one URL are required",
            Self::Command => "Title and command are required",
            Self::Note => "Title and content are required",
            Self::Website => "Title, URL, and category are required",
        }
    }

    /// Message returned when a write would violate the kind's unique field.
    pub fn duplicate_message(&self) -> &'static str {
        match self {
            Self::KeyValue => "Key already exists",
            Self::Project => "Project name already exists",
            Self::Website => "Website title already exists",
            Self::Command => "Command already exists",
            Self::Note => "Note already exists",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.collection())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "keyvalues" | "keyvalue" | "key-value" | "key-values" | "kv" => Ok(Self::KeyValue),
            "projects" | "project" => Ok(Self::Project),
            "commands" | "command" | "cmd" => Ok(Self::Command),
            "notes" | "note" => Ok(Self::Note),
            "websites" | "website" | "site" | "sites" => Ok(Self::Website),
            other => Err(Error::InvalidInput(format!(
                "Unknown entity '{}' (expected one of: keyvalues, projects, commands, notes, websites)",
                other
            ))),
        }
    }
}

/// A persisted document: the entity's fields plus identity and timestamps.
///
/// Serialized with the field names the browser client expects
/// (`_id`, `createdAt`, `updatedAt`) alongside the flattened entity fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<D> {
    /// Server-assigned identifier (hyphenated UUID v4), immutable
    #[serde(rename = "_id")]
    pub id: String,

    /// The entity's own fields
    #[serde(flatten)]
    pub doc: D,

    /// Creation timestamp
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    /// Last update timestamp, never earlier than `created_at`
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// An entity kind that can be stored as a document.
///
/// `Draft` is the request body accepted on create and update; converting it
/// with [`Document::from_draft`] performs the required-field validation.
pub trait Document:
    Serialize + DeserializeOwned + Clone + fmt::Debug + PartialEq + Send + Sync + 'static
{
    /// Which kind this is.
    const KIND: EntityKind;

    /// Unvalidated request body.
    type Draft: Serialize + DeserializeOwned + Default + fmt::Debug + Send + Sync + 'static;

    /// Validate a draft into a complete document.
    fn from_draft(draft: Self::Draft) -> Result<Self>;

    /// Value of the kind's unique field, if it has one.
    fn unique_key(&self) -> Option<&str> {
        None
    }
}

/// A uniquely keyed string value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl Document for KeyValue {
    const KIND: EntityKind = EntityKind::KeyValue;
    type Draft = KeyValueDraft;

    fn from_draft(draft: KeyValueDraft) -> Result<Self> {
        let missing = || Error::InvalidInput(Self::KIND.required_message().to_string());
        Ok(Self {
            key: draft::present(draft.key).ok_or_else(missing)?,
            value: draft::present(draft.value).ok_or_else(missing)?,
        })
    }

    fn unique_key(&self) -> Option<&str> {
        Some(&self.key)
    }
}

/// A uniquely named project and the URLs that belong to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub urls: Vec<String>,
}

impl Document for Project {
    const KIND: EntityKind = EntityKind::Project;
    type Draft = ProjectDraft;

    fn from_draft(draft: ProjectDraft) -> Result<Self> {
        let missing = || Error::InvalidInput(Self::KIND.required_message().to_string());
        let name = draft::present(draft.name).ok_or_else(missing)?;
        // Entries themselves are not checked here; blank URLs are dropped by the client form.
        let urls = draft.urls.filter(|urls| !urls.is_empty()).ok_or_else(missing)?;
        Ok(Self { name, urls })
    }

    fn unique_key(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// A titled shell command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub title: String,
    pub command: String,
}

impl Document for Command {
    const KIND: EntityKind = EntityKind::Command;
    type Draft = CommandDraft;

    fn from_draft(draft: CommandDraft) -> Result<Self> {
        let missing = || Error::InvalidInput(Self::KIND.required_message().to_string());
        Ok(Self {
            title: draft::present(draft.title).ok_or_else(missing)?,
            command: draft::present(draft.command).ok_or_else(missing)?,
        })
    }
}

/// A titled free-text note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    pub content: String,
}

impl Document for Note {
    const KIND: EntityKind = EntityKind::Note;
    type Draft = NoteDraft;

    fn from_draft(draft: NoteDraft) -> Result<Self> {
        let missing = || Error::InvalidInput(Self::KIND.required_message().to_string());
        Ok(Self {
            title: draft::present(draft.title).ok_or_else(missing)?,
            content: draft::present(draft.content).ok_or_else(missing)?,
        })
    }
}

/// Website category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebsiteCategory {
    #[serde(rename = "AI")]
    Ai,
    #[serde(rename = "AI Agent")]
    AiAgent,
    #[serde(rename = "Deployed")]
    Deployed,
}

impl WebsiteCategory {
    pub const ALL: [WebsiteCategory; 3] = [Self::Ai, Self::AiAgent, Self::Deployed];

    /// The label stored and shown for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "AI",
            Self::AiAgent => "AI Agent",
            Self::Deployed => "Deployed",
        }
    }
}

impl fmt::Display for WebsiteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WebsiteCategory {
    type Err = Error;

    /// Labels must match exactly.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("\"{}\" is not a valid category", s)))
    }
}

/// A uniquely titled bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Website {
    pub title: String,
    pub url: String,
    pub category: WebsiteCategory,
}

impl Document for Website {
    const KIND: EntityKind = EntityKind::Website;
    type Draft = WebsiteDraft;

    fn from_draft(draft: WebsiteDraft) -> Result<Self> {
        let missing = || Error::InvalidInput(Self::KIND.required_message().to_string());
        let title = draft::present(draft.title).ok_or_else(missing)?;
        let url = draft::present(draft.url).ok_or_else(missing)?;
        let category = draft::present(draft.category).ok_or_else(missing)?;
        Ok(Self {
            title,
            url,
            category: category.parse()?,
        })
    }

    fn unique_key(&self) -> Option<&str> {
        Some(&self.title)
    }
}
