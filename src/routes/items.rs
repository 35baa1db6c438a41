//! CRUD handlers shared by the movie and TV show collections.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::RecordStore,
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{strip_legacy_fields, ItemPatch, MediaKind, NewItem, WatchableItem},
};

/// State of one collection's sub-router
#[derive(Clone)]
pub struct Collection {
    store: Arc<dyn RecordStore>,
    kind: MediaKind,
}

impl Collection {
    fn not_found(&self) -> AppError {
        AppError::NotFound(format!("{} not found", self.kind.label()))
    }
}

/// Routes for a single collection, to be nested under its base path
pub fn collection_routes<S>(store: Arc<dyn RecordStore>, kind: MediaKind) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(fetch).put(update).delete(remove))
        .with_state(Collection { store, kind })
}

/// Ids that are not UUIDs cannot name a record
fn parse_id(raw: &str, collection: &Collection) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| collection.not_found())
}

/// Decodes a write body, dropping legacy keys first
fn decode_payload<T: DeserializeOwned>(
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<T> {
    let Json(mut body) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    strip_legacy_fields(&mut body);
    serde_json::from_value(body).map_err(|e| AppError::Validation(e.to_string()))
}

async fn list(State(collection): State<Collection>) -> AppResult<Json<Vec<WatchableItem>>> {
    let items = collection.store.list().await?;
    tracing::info!(
        collection = collection.kind.collection(),
        count = items.len(),
        "Listed items"
    );
    Ok(Json(items))
}

async fn fetch(
    State(collection): State<Collection>,
    Path(id): Path<String>,
) -> AppResult<Json<WatchableItem>> {
    let id = parse_id(&id, &collection)?;
    collection
        .store
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| collection.not_found())
}

async fn create(
    State(collection): State<Collection>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<WatchableItem>)> {
    let new: NewItem = decode_payload(payload)?;
    let item = collection.store.create(new).await?;

    tracing::info!(
        request_id = %request_id,
        collection = collection.kind.collection(),
        id = %item.id,
        title = %item.title,
        "Item created"
    );

    Ok((StatusCode::CREATED, Json(item)))
}

async fn update(
    State(collection): State<Collection>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<WatchableItem>> {
    let id = parse_id(&id, &collection)?;
    let patch: ItemPatch = decode_payload(payload)?;

    let item = collection
        .store
        .update(id, patch)
        .await?
        .ok_or_else(|| collection.not_found())?;

    tracing::info!(
        request_id = %request_id,
        collection = collection.kind.collection(),
        id = %item.id,
        "Item updated"
    );

    Ok(Json(item))
}

async fn remove(
    State(collection): State<Collection>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id, &collection)?;
    if !collection.store.delete(id).await? {
        return Err(collection.not_found());
    }

    tracing::info!(
        request_id = %request_id,
        collection = collection.kind.collection(),
        id = %id,
        "Item deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}
