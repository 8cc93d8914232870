use tracing::{debug, info};

use super::errors::StoreError;
use crate::record::{Item, ItemPatch, NewItem, generate_item_id};
use crate::{Instance, Result};

/// Item collection handle.
pub struct Items<'a> {
    instance: &'a Instance,
}

impl<'a> Items<'a> {
    pub(crate) fn new(instance: &'a Instance) -> Self {
        Self { instance }
    }

    /// All items in creation order.
    pub async fn list(&self) -> Result<Vec<Item>> {
        self.instance.backend().list_items().await
    }

    /// Fetch a single item.
    pub async fn get(&self, id: &str) -> Result<Item> {
        self.instance
            .backend()
            .get_item(id)
            .await?
            .ok_or_else(|| StoreError::ItemNotFound { id: id.to_string() }.into())
    }

    /// Stores a new item with a fresh id.
    ///
    /// `dateAdded` defaults to today's date when not supplied.
    pub async fn add(&self, item: NewItem) -> Result<Item> {
        let clock = self.instance.clock();
        let record = item.into_record(generate_item_id(), clock.today(), clock.now_rfc3339());

        let _gate = self.instance.write_gate().await;
        self.instance.backend().put_item(record.clone()).await?;
        info!(id = %record.id, name = %record.name, "added item");
        Ok(record)
    }

    /// Applies a partial update and stamps `updatedAt`.
    pub async fn update(&self, id: &str, patch: ItemPatch) -> Result<Item> {
        let _gate = self.instance.write_gate().await;
        let backend = self.instance.backend();
        let mut item = backend
            .get_item(id)
            .await?
            .ok_or_else(|| StoreError::ItemNotFound { id: id.to_string() })?;

        patch.apply(&mut item);
        item.updated_at = Some(self.instance.clock().now_rfc3339());
        backend.put_item(item.clone()).await?;
        debug!(id, "updated item");
        Ok(item)
    }

    /// Deletes an item; returns whether it existed.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let _gate = self.instance.write_gate().await;
        let existed = self.instance.backend().remove_item(id).await?;
        if existed {
            info!(id, "removed item");
        }
        Ok(existed)
    }

    /// Deletes every item; returns how many were removed.
    pub async fn clear(&self) -> Result<usize> {
        let _gate = self.instance.write_gate().await;
        let count = self.instance.backend().clear_items().await?;
        info!(count, "cleared items");
        Ok(count)
    }
}
