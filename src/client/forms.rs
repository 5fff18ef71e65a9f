//! Form normalization done before anything is sent to the server.

use crate::models::{EntityKind, ProjectDraft};
use crate::{Error, Result};

/// Project form state: a name plus a growable list of URL inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectForm {
    pub name: String,
    pub urls: Vec<String>,
}

impl ProjectForm {
    pub fn new(name: impl Into<String>, urls: Vec<String>) -> Self {
        Self {
            name: name.into(),
            urls,
        }
    }

    /// Append an empty URL input.
    pub fn add_url_field(&mut self) {
        self.urls.push(String::new());
    }

    /// Remove the URL input at `index`; the last remaining input is kept.
    pub fn remove_url_field(&mut self, index: usize) {
        if self.urls.len() > 1 && index < self.urls.len() {
            self.urls.remove(index);
        }
    }

    /// Trim every URL, drop the blank ones, and build the request body.
    ///
    /// Fails without contacting the server when the name is blank or no URL
    /// survives trimming.
    pub fn into_draft(self) -> Result<ProjectDraft> {
        let urls: Vec<String> = self
            .urls
            .iter()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect();

        if self.name.trim().is_empty() || urls.is_empty() {
            return Err(Error::InvalidInput(
                EntityKind::Project.required_message().to_string(),
            ));
        }

        Ok(ProjectDraft {
            name: Some(self.name),
            urls: Some(urls),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_urls_are_trimmed_and_blanks_dropped() {
        let form = ProjectForm::new("site", urls(&["  https://a.dev ", "", "   ", "https://b.dev"]));
        let draft = form.into_draft().unwrap();
        assert_eq!(draft.name.as_deref(), Some("site"));
        assert_eq!(draft.urls.unwrap(), urls(&["https://a.dev", "https://b.dev"]));
    }

    #[test]
    fn test_all_blank_urls_rejected() {
        let form = ProjectForm::new("site", urls(&["", "  "]));
        let err = form.into_draft().unwrap_err();
        assert_eq!(err.to_string(), "Name and at least one URL are required");
    }

    #[test]
    fn test_blank_name_rejected() {
        let form = ProjectForm::new("  ", urls(&["https://a.dev"]));
        assert!(form.into_draft().is_err());
    }

    #[test]
    fn test_url_fields_grow_and_shrink() {
        let mut form = ProjectForm::new("site", urls(&["https://a.dev"]));
        form.add_url_field();
        assert_eq!(form.urls.len(), 2);
        form.remove_url_field(1);
        assert_eq!(form.urls, urls(&["https://a.dev"]));
        form.remove_url_field(0);
        assert_eq!(form.urls.len(), 1);
    }
}
