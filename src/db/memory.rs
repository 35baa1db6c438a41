use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::RecordStore;
use crate::{
    error::AppResult,
    models::{ItemPatch, NewItem, WatchableItem},
};

/// Record store held in process memory. Used for local runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<Uuid, WatchableItem>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<WatchableItem>> {
        let items = self.items.read().await;
        let mut list: Vec<WatchableItem> = items.values().cloned().collect();
        list.sort_by_key(|item| item.created_at);
        Ok(list)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<WatchableItem>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn create(&self, new: NewItem) -> AppResult<WatchableItem> {
        let item = new.into_item(Utc::now())?;
        self.items.write().await.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update(&self, id: Uuid, patch: ItemPatch) -> AppResult<Option<WatchableItem>> {
        let mut items = self.items.write().await;
        let Some(existing) = items.get(&id) else {
            return Ok(None);
        };

        // Patch a copy so a rejected patch leaves the stored record untouched
        let mut item = existing.clone();
        patch.apply(&mut item, Utc::now())?;
        items.insert(id, item.clone());
        Ok(Some(item))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.items.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn new_item(title: &str) -> NewItem {
        serde_json::from_value(json!({ "title": title })).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let store = MemoryStore::new();
        let first = assert_ok!(store.create(new_item("Alien")).await);
        let second = assert_ok!(store.create(new_item("Aliens")).await);

        let list = store.list().await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, first.id);
        assert_eq!(list[1].id, second.id);
    }

    #[tokio::test]
    async fn test_duplicate_titles_allowed() {
        let store = MemoryStore::new();
        store.create(new_item("Dune")).await.unwrap();
        store.create(new_item("Dune")).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_without_title_fails() {
        let store = MemoryStore::new();
        assert_err!(store.create(NewItem::default()).await);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let store = MemoryStore::new();
        let result = store
            .update(Uuid::new_v4(), ItemPatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_rejected_patch_keeps_record() {
        let store = MemoryStore::new();
        let item = store.create(new_item("Heat")).await.unwrap();
        let patch: ItemPatch = serde_json::from_value(json!({ "title": "" })).unwrap();

        assert_err!(store.update(item.id, patch).await);
        assert_eq!(store.get(item.id).await.unwrap(), Some(item));
    }

    #[tokio::test]
    async fn test_delete_is_permanent() {
        let store = MemoryStore::new();
        let item = store.create(new_item("Heat")).await.unwrap();

        assert!(store.delete(item.id).await.unwrap());
        assert!(store.get(item.id).await.unwrap().is_none());
        assert!(!store.delete(item.id).await.unwrap());
    }
}
