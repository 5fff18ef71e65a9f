//! Client side of devshelf.
//!
//! - [`ApiClient`] talks to a running server
//! - [`query`] searches, filters and sorts a fetched collection in memory
//! - [`forms`] normalizes form input before it is submitted
//! - [`stats`] aggregates counts across collections

pub mod forms;
pub mod query;
pub mod stats;

pub use forms::ProjectForm;
pub use query::{CategoryFilter, Direction, EmptyState, ListView, Listable, SortValue};
pub use stats::{Metric, Statistics};

use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::models::{Document, Record};
use crate::{Error, Result};

/// Default server URL for the client.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3030";

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

/// HTTP client for the devshelf REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the server at `base_url` (e.g. `http://127.0.0.1:3030`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url<D: Document>(&self) -> String {
        format!("{}/api/{}", self.base_url, D::KIND.collection())
    }

    fn record_url<D: Document>(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url::<D>(), id)
    }

    /// Fetch a whole collection, in server order (newest first).
    pub async fn list<D: Document>(&self) -> Result<Vec<Record<D>>> {
        let response = self.http.get(self.collection_url::<D>()).send().await?;
        decode(response).await
    }

    /// Fetch one record.
    pub async fn get<D: Document>(&self, id: &str) -> Result<Record<D>> {
        let response = self.http.get(self.record_url::<D>(id)).send().await?;
        decode(response).await
    }

    /// Create a record from a draft.
    pub async fn create<D: Document>(&self, draft: &D::Draft) -> Result<Record<D>> {
        let response = self
            .http
            .post(self.collection_url::<D>())
            .json(draft)
            .send()
            .await?;
        decode(response).await
    }

    /// Replace a record's fields.
    pub async fn update<D: Document>(&self, id: &str, draft: &D::Draft) -> Result<Record<D>> {
        let response = self
            .http
            .put(self.record_url::<D>(id))
            .json(draft)
            .send()
            .await?;
        decode(response).await
    }

    /// Delete a record, returning the server's confirmation message.
    pub async fn delete<D: Document>(&self, id: &str) -> Result<String> {
        let response = self.http.delete(self.record_url::<D>(id)).send().await?;
        let body: MessageBody = decode(response).await?;
        Ok(body.message)
    }
}

/// Decode a success body, or turn an error body into [`Error::Api`].
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or_else(|_| fallback_message(status, &text));
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

fn fallback_message(status: StatusCode, text: &str) -> String {
    if text.trim().is_empty() {
        status.to_string()
    } else {
        text.trim().to_string()
    }
}
