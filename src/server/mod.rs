//! Web server exposing the REST API.
//!
//! Each entity kind gets the same five routes under `/api/<collection>`:
//! list and create on the collection, get, replace and delete on `/:id`.

pub mod handlers;

use axum::{Router, routing::get};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::models::{Command, Document, KeyValue, Note, Project, Website};
use crate::storage::Connector;
use crate::{Error, Result};

/// Default port for the server
pub const DEFAULT_PORT: u16 = 3030;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Connector owning the store handle
    pub connector: Arc<Connector>,
}

impl AppState {
    pub fn new(connector: Arc<Connector>) -> Self {
        Self { connector }
    }
}

/// Build the router with every collection mounted.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(collection_routes::<KeyValue>())
        .merge(collection_routes::<Project>())
        .merge(collection_routes::<Command>())
        .merge(collection_routes::<Note>())
        .merge(collection_routes::<Website>());

    Router::new()
        .nest("/api", api)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn collection_routes<D: Document>() -> Router<AppState> {
    let base = format!("/{}", D::KIND.collection());
    Router::new()
        .route(
            &base,
            get(handlers::list::<D>)
                .post(handlers::create::<D>)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            &format!("{}/:id", base),
            get(handlers::show::<D>)
                .put(handlers::update::<D>)
                .delete(handlers::remove::<D>)
                .fallback(handlers::method_not_allowed),
        )
}

/// Serve the API on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Start the server on `host:port` and run until Ctrl+C.
pub async fn start_server(connector: Arc<Connector>, host: &str, port: u16) -> Result<()> {
    let host_addr: std::net::IpAddr = host
        .parse()
        .map_err(|e| Error::Config(format!("Invalid host address '{}': {}", host, e)))?;
    let addr = SocketAddr::from((host_addr, port));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        database = %connector.url(),
        "devshelf server listening"
    );

    serve(listener, AppState::new(connector), shutdown_signal()).await?;
    tracing::info!("devshelf server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
