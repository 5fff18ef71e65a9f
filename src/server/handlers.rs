//! Collection handlers, written once and instantiated per entity kind.
//!
//! Every failure is turned into a JSON `{"error": ...}` body by [`ApiError`]:
//! validation and uniqueness problems are 400, unresolvable IDs are 404 and
//! anything else is a 500 carrying the underlying message.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use super::AppState;
use crate::Error;
use crate::models::{Document, Record};

/// Error wrapper that knows how to become an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status for the wrapped error.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::InvalidInput(_) | Error::InvalidId(_) | Error::Duplicate(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self.0, "request rejected");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Decode a request body into a draft, whatever its Content-Type.
///
/// Only a JSON object can carry fields; any other JSON value is treated as
/// a body with every required field missing.
fn parse_draft<D: Document>(body: &[u8]) -> crate::Result<D::Draft> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| Error::InvalidInput(format!("Invalid JSON body: {}", e)))?;
    if !value.is_object() {
        return Err(Error::InvalidInput(D::KIND.required_message().to_string()));
    }
    serde_json::from_value(value).map_err(|e| Error::InvalidInput(e.to_string()))
}

/// `GET /api/<collection>`
pub async fn list<D: Document>(State(state): State<AppState>) -> ApiResult<Json<Vec<Record<D>>>> {
    let handle = state.connector.handle().await?;
    let storage = handle.lock().await;
    Ok(Json(storage.list::<D>()?))
}

/// `POST /api/<collection>`
pub async fn create<D: Document>(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Record<D>>)> {
    let doc = D::from_draft(parse_draft::<D>(&body)?)?;

    let handle = state.connector.handle().await?;
    let mut storage = handle.lock().await;
    let record = storage.insert(doc)?;
    tracing::info!(collection = D::KIND.collection(), id = %record.id, "created record");

    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/<collection>/:id`
pub async fn show<D: Document>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Record<D>>> {
    let handle = state.connector.handle().await?;
    let storage = handle.lock().await;
    Ok(Json(storage.get::<D>(&id)?))
}

/// `PUT /api/<collection>/:id`
pub async fn update<D: Document>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Record<D>>> {
    let doc = D::from_draft(parse_draft::<D>(&body)?)?;

    let handle = state.connector.handle().await?;
    let mut storage = handle.lock().await;
    let record = storage.replace(&id, doc)?;
    tracing::info!(collection = D::KIND.collection(), id = %record.id, "updated record");

    Ok(Json(record))
}

/// `DELETE /api/<collection>/:id`
pub async fn remove<D: Document>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let handle = state.connector.handle().await?;
    let mut storage = handle.lock().await;
    storage.delete::<D>(&id)?;
    tracing::info!(collection = D::KIND.collection(), id = %id, "deleted record");

    Ok(Json(json!({
        "message": format!("{} deleted successfully", D::KIND.display_name())
    })))
}

/// Fallback for known routes hit with an unsupported method.
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}

/// Fallback for routes that do not exist.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
