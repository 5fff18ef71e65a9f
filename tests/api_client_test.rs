//! `ApiClient` against an in-process server backed by a database file.

use devshelf::Error;
use devshelf::client::{ApiClient, ListView, Statistics};
use devshelf::client::query::NoteSort;
use devshelf::models::{KeyValue, KeyValueDraft, Note, NoteDraft, Project, ProjectDraft};
use devshelf::server::{AppState, serve};
use devshelf::storage::{Connector, DatabaseUrl};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct Harness {
    client: ApiClient,
    stop: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<()>,
}

impl Harness {
    async fn start(url: DatabaseUrl) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let state = AppState::new(Arc::new(Connector::new(url)));
        let task = tokio::spawn(async move {
            serve(listener, state, async move {
                let _ = rx.await;
            })
            .await
            .unwrap();
        });
        Self {
            client: ApiClient::new(format!("http://{}/", addr)),
            stop: Some(tx),
            task,
        }
    }

    async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.task.await.unwrap();
    }
}

fn note(title: &str, content: &str) -> NoteDraft {
    NoteDraft {
        title: Some(title.to_string()),
        content: Some(content.to_string()),
    }
}

#[tokio::test]
async fn test_crud_over_http() {
    let dir = TempDir::new().unwrap();
    let harness = Harness::start(DatabaseUrl::File(dir.path().join("shelf.db"))).await;
    let client = &harness.client;

    let created = client.create::<Note>(&note("todo", "write tests")).await.unwrap();
    assert_eq!(created.created_at, created.updated_at);

    let fetched = client.get::<Note>(&created.id).await.unwrap();
    assert_eq!(fetched, created);

    let updated = client
        .update::<Note>(&created.id, &note("todo", "tests written"))
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    let message = client.delete::<Note>(&created.id).await.unwrap();
    assert_eq!(message, "Note deleted successfully");

    match client.get::<Note>(&created.id).await {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Note not found");
        }
        other => panic!("expected 404, got {:?}", other),
    }

    harness.shutdown().await;
}

#[tokio::test]
async fn test_validation_errors_carry_status_and_message() {
    let harness = Harness::start(DatabaseUrl::Memory).await;
    let client = &harness.client;

    let err = client
        .create::<KeyValue>(&KeyValueDraft {
            key: Some("k".to_string()),
            value: Some("   ".to_string()),
        })
        .await
        .unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Key and value are required");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let err = client.get::<KeyValue>("not-a-uuid").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid ID format: not-a-uuid");

    harness.shutdown().await;
}

#[tokio::test]
async fn test_list_view_over_fetched_records() {
    let harness = Harness::start(DatabaseUrl::Memory).await;
    let client = &harness.client;

    for title in ["Foo", "Bar", "food"] {
        client.create::<Note>(&note(title, "body")).await.unwrap();
    }

    let mut view = ListView::new(client.list::<Note>().await.unwrap());
    let server_order: Vec<String> = view.items().iter().map(|n| n.doc.title.clone()).collect();
    assert_eq!(server_order, vec!["food", "Bar", "Foo"]);

    view.set_search("foo");
    view.toggle_sort(NoteSort::Title);
    let titles: Vec<&str> = view.items().iter().map(|n| n.doc.title.as_str()).collect();
    assert_eq!(titles, vec!["Foo", "food"]);

    harness.shutdown().await;
}

#[tokio::test]
async fn test_statistics_fetch() {
    let harness = Harness::start(DatabaseUrl::Memory).await;
    let client = &harness.client;

    client
        .create::<Project>(&ProjectDraft {
            name: Some("shelf".to_string()),
            urls: Some(vec!["https://a".to_string(), "https://b".to_string()]),
        })
        .await
        .unwrap();
    client.create::<Note>(&note("n", "c")).await.unwrap();

    let stats = Statistics::fetch(client).await.unwrap();
    assert_eq!(stats.projects, 1);
    assert_eq!(stats.notes, 1);
    assert_eq!(stats.total_urls, 2);
    assert_eq!(stats.total_items, 2);

    harness.shutdown().await;
}

#[tokio::test]
async fn test_statistics_fail_when_store_unavailable() {
    let dir = TempDir::new().unwrap();
    let unreachable = dir.path().join("missing").join("shelf.db");
    let harness = Harness::start(DatabaseUrl::File(unreachable)).await;

    let err = Statistics::fetch(&harness.client).await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("Failed to connect to the document store"));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    harness.shutdown().await;
}
