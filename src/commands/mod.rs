//! Command implementations for the devshelf CLI.
//!
//! Every client command goes through [`ApiClient`]; results implement
//! [`CommandResult`] so `main` can print them as JSON or for humans.

use serde::Serialize;
use serde_json::json;

use crate::cli::EntityArgs;
use crate::client::query::parse_sort_key;
use crate::client::{ApiClient, CategoryFilter, Direction, ListView, Listable, ProjectForm, Statistics};
use crate::config::Settings;
use crate::models::{
    Command, CommandDraft, Document, EntityKind, KeyValue, KeyValueDraft, Note, NoteDraft,
    Project, Record, Website, WebsiteDraft,
};
use crate::server;
use crate::storage::Connector;
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Labelled fields for human output.
pub trait Fields {
    /// `(label, value)` pairs in display order.
    fn fields(&self) -> Vec<(&'static str, String)>;

    /// One-line summary for list output.
    fn summary(&self) -> String;
}

impl Fields for KeyValue {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![("key", self.key.clone()), ("value", self.value.clone())]
    }

    fn summary(&self) -> String {
        format!("{} = {}", self.key, self.value)
    }
}

impl Fields for Project {
    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("name", self.name.clone())];
        fields.extend(self.urls.iter().map(|url| ("url", url.clone())));
        fields
    }

    fn summary(&self) -> String {
        let noun = if self.urls.len() == 1 { "URL" } else { "URLs" };
        format!("{} ({} {})", self.name, self.urls.len(), noun)
    }
}

impl Fields for Command {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![("title", self.title.clone()), ("command", self.command.clone())]
    }

    fn summary(&self) -> String {
        format!("{}: {}", self.title, self.command)
    }
}

impl Fields for Note {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![("title", self.title.clone()), ("content", self.content.clone())]
    }

    fn summary(&self) -> String {
        let first_line = self.content.lines().next().unwrap_or_default();
        format!("{}: {}", self.title, first_line)
    }
}

impl Fields for Website {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("title", self.title.clone()),
            ("url", self.url.clone()),
            ("category", self.category.to_string()),
        ]
    }

    fn summary(&self) -> String {
        format!("{} [{}] {}", self.title, self.category, self.url)
    }
}

fn to_json_string<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| json!({ "error": e.to_string() }).to_string())
}

/// A single record, as returned by show, add and edit.
#[derive(Debug, Clone)]
pub struct RecordOutput<D> {
    pub record: Record<D>,
}

impl<D: Document + Fields> CommandResult for RecordOutput<D> {
    fn to_json(&self) -> String {
        to_json_string(&self.record)
    }

    fn to_human(&self) -> String {
        let record = &self.record;
        let mut lines = vec![format!("{} {}", D::KIND.display_name(), record.id)];
        for (label, value) in record.doc.fields() {
            lines.push(format!("  {}: {}", label, value));
        }
        lines.push(format!("  created: {}", record.created_at.to_rfc3339()));
        lines.push(format!("  updated: {}", record.updated_at.to_rfc3339()));
        lines.join("\n")
    }
}

/// The visible part of a collection after search, filter and sort.
#[derive(Debug, Clone)]
pub struct ListOutput<D> {
    pub items: Vec<Record<D>>,
    /// Empty-state message when nothing is visible
    pub message: Option<String>,
}

impl<D: Document + Fields> CommandResult for ListOutput<D> {
    fn to_json(&self) -> String {
        let mut body = json!({
            "count": self.items.len(),
            "items": self.items,
        });
        if let Some(message) = &self.message {
            body["message"] = json!(message);
        }
        to_json_string(&body)
    }

    fn to_human(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        let mut lines = vec![format!("{} {}:", self.items.len(), D::KIND.plural_label())];
        for record in &self.items {
            lines.push(format!("  {}  {}", record.id, record.doc.summary()));
        }
        lines.join("\n")
    }
}

/// Confirmation from a delete.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteOutput {
    pub id: String,
    pub message: String,
}

impl CommandResult for DeleteOutput {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        format!("{} ({})", self.message, self.id)
    }
}

impl CommandResult for Statistics {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let metrics = self.metrics();
        let width = metrics.iter().map(|m| m.label.len()).max().unwrap_or(0);
        metrics
            .iter()
            .map(|m| format!("{:<width$}  {}", m.label, m.value, width = width))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Search, filter and sort settings for `list`.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub descending: bool,
    pub category: Option<CategoryFilter>,
}

/// Run the HTTP server with the resolved settings.
pub async fn serve(settings: &Settings) -> Result<()> {
    let url = settings.require_database_url()?;
    let connector = Connector::install(url);
    server::start_server(connector, &settings.host.value, settings.port.value).await
}

/// Fetch a collection and pass it through the list engine.
pub async fn list_records<D>(client: &ApiClient, options: ListOptions) -> Result<ListOutput<D>>
where
    D: Document + Fields,
    Record<D>: Listable,
{
    let mut view = ListView::new(client.list::<D>().await?);
    apply_options(&mut view, options)?;

    let message = view.empty_state().map(|state| state.message(D::KIND));
    let items = view.items().into_iter().cloned().collect();
    Ok(ListOutput { items, message })
}

fn apply_options<R: Listable>(view: &mut ListView<R>, options: ListOptions) -> Result<()> {
    if let Some(term) = options.search {
        view.set_search(term);
    }
    if let Some(category) = options.category {
        if R::KIND != EntityKind::Website {
            return Err(Error::InvalidInput(
                "--category only applies to websites".to_string(),
            ));
        }
        view.set_category(category);
    }
    if let Some(name) = options.sort {
        let direction = if options.descending {
            Direction::Descending
        } else {
            Direction::Ascending
        };
        view.set_sort(parse_sort_key(&name)?, direction);
    }
    Ok(())
}

/// `list <entity>`
pub async fn list(
    client: &ApiClient,
    kind: EntityKind,
    options: ListOptions,
) -> Result<Box<dyn CommandResult>> {
    Ok(match kind {
        EntityKind::KeyValue => Box::new(list_records::<KeyValue>(client, options).await?),
        EntityKind::Project => Box::new(list_records::<Project>(client, options).await?),
        EntityKind::Command => Box::new(list_records::<Command>(client, options).await?),
        EntityKind::Note => Box::new(list_records::<Note>(client, options).await?),
        EntityKind::Website => Box::new(list_records::<Website>(client, options).await?),
    })
}

async fn show_record<D: Document + Fields>(client: &ApiClient, id: &str) -> Result<RecordOutput<D>> {
    Ok(RecordOutput {
        record: client.get::<D>(id).await?,
    })
}

/// `show <entity> <id>`
pub async fn show(client: &ApiClient, kind: EntityKind, id: &str) -> Result<Box<dyn CommandResult>> {
    Ok(match kind {
        EntityKind::KeyValue => Box::new(show_record::<KeyValue>(client, id).await?),
        EntityKind::Project => Box::new(show_record::<Project>(client, id).await?),
        EntityKind::Command => Box::new(show_record::<Command>(client, id).await?),
        EntityKind::Note => Box::new(show_record::<Note>(client, id).await?),
        EntityKind::Website => Box::new(show_record::<Website>(client, id).await?),
    })
}

async fn save<D: Document + Fields>(
    client: &ApiClient,
    id: Option<&str>,
    draft: D::Draft,
) -> Result<RecordOutput<D>> {
    let record = match id {
        Some(id) => client.update::<D>(id, &draft).await?,
        None => client.create::<D>(&draft).await?,
    };
    Ok(RecordOutput { record })
}

/// `add ...` when `id` is `None`, `edit <id> ...` otherwise.
pub async fn save_entity(
    client: &ApiClient,
    id: Option<&str>,
    args: EntityArgs,
) -> Result<Box<dyn CommandResult>> {
    Ok(match args {
        EntityArgs::KeyValue { key, value } => {
            let draft = KeyValueDraft {
                key: Some(key),
                value: Some(value),
            };
            Box::new(save::<KeyValue>(client, id, draft).await?)
        }
        EntityArgs::Project { name, urls } => {
            let draft = ProjectForm::new(name, urls).into_draft()?;
            Box::new(save::<Project>(client, id, draft).await?)
        }
        EntityArgs::Command { title, command } => {
            let draft = CommandDraft {
                title: Some(title),
                command: Some(command),
            };
            Box::new(save::<Command>(client, id, draft).await?)
        }
        EntityArgs::Note { title, content } => {
            let draft = NoteDraft {
                title: Some(title),
                content: Some(content),
            };
            Box::new(save::<Note>(client, id, draft).await?)
        }
        EntityArgs::Website {
            title,
            url,
            category,
        } => {
            let draft = WebsiteDraft {
                title: Some(title),
                url: Some(url),
                category: Some(category),
            };
            Box::new(save::<Website>(client, id, draft).await?)
        }
    })
}

/// `rm <entity> <id>`
pub async fn remove(client: &ApiClient, kind: EntityKind, id: &str) -> Result<DeleteOutput> {
    let message = match kind {
        EntityKind::KeyValue => client.delete::<KeyValue>(id).await?,
        EntityKind::Project => client.delete::<Project>(id).await?,
        EntityKind::Command => client.delete::<Command>(id).await?,
        EntityKind::Note => client.delete::<Note>(id).await?,
        EntityKind::Website => client.delete::<Website>(id).await?,
    };
    Ok(DeleteOutput {
        id: id.to_string(),
        message,
    })
}

/// `stats`
pub async fn stats(client: &ApiClient) -> Result<Statistics> {
    Statistics::fetch(client).await
}
