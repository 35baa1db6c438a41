//! Record store: one collection of watchable items per media kind.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{ItemPatch, NewItem, WatchableItem},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{create_pool, PgRecordStore};

/// Persistent collection of watchable items
///
/// Each write touches a single record; concurrent updates to the same id are
/// last-write-wins.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All items, oldest first
    async fn list(&self) -> AppResult<Vec<WatchableItem>>;

    async fn get(&self, id: Uuid) -> AppResult<Option<WatchableItem>>;

    /// Validates and inserts a new item
    async fn create(&self, new: NewItem) -> AppResult<WatchableItem>;

    /// Applies a partial update. `Ok(None)` when no item has this id.
    async fn update(&self, id: Uuid, patch: ItemPatch) -> AppResult<Option<WatchableItem>>;

    /// Hard delete. Returns whether an item was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Connectivity check
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    /// Releases backend resources at shutdown
    async fn close(&self) {}
}
