//! Summary counts across the collections.

use serde::Serialize;

use super::ApiClient;
use crate::Result;
use crate::models::{Command, KeyValue, Note, Project, Record};

/// Counts shown on the statistics page.
///
/// Websites are not part of the summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub key_values: usize,
    pub projects: usize,
    pub commands: usize,
    pub notes: usize,
    /// Sum of URL list lengths over all projects
    pub total_urls: usize,
    /// key_values + projects + commands + notes
    pub total_items: usize,
}

/// One labelled figure on the statistics page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub label: &'static str,
    pub value: usize,
}

impl Statistics {
    pub fn from_collections(
        key_values: &[Record<KeyValue>],
        projects: &[Record<Project>],
        commands: &[Record<Command>],
        notes: &[Record<Note>],
    ) -> Self {
        let total_urls = projects.iter().map(|p| p.doc.urls.len()).sum();
        Self {
            key_values: key_values.len(),
            projects: projects.len(),
            commands: commands.len(),
            notes: notes.len(),
            total_urls,
            total_items: key_values.len() + projects.len() + commands.len() + notes.len(),
        }
    }

    /// Fetch the four collections concurrently and summarize them.
    ///
    /// Any failed fetch fails the whole summary.
    pub async fn fetch(client: &ApiClient) -> Result<Self> {
        let (key_values, projects, commands, notes) = tokio::try_join!(
            client.list::<KeyValue>(),
            client.list::<Project>(),
            client.list::<Command>(),
            client.list::<Note>(),
        )?;
        Ok(Self::from_collections(
            &key_values,
            &projects,
            &commands,
            &notes,
        ))
    }

    /// Figures in display order.
    pub fn metrics(&self) -> [Metric; 6] {
        [
            Metric { label: "Key-Value Pairs", value: self.key_values },
            Metric { label: "Projects", value: self.projects },
            Metric { label: "Commands", value: self.commands },
            Metric { label: "Notes", value: self.notes },
            Metric { label: "Total URLs", value: self.total_urls },
            Metric { label: "Total Items", value: self.total_items },
        ]
    }
}
