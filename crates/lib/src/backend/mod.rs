//! Storage backends for items and elements.
//!
//! The [`BackendImpl`] trait is the storage port. Items are read and written
//! as whole records; the store layer serializes item read-modify-write
//! sequences through the instance writer gate. Element writes are different:
//! a sync may race an editor annotation of the same guid from another
//! process, so the backend applies both as one atomic step per record and
//! the merge never works from a stale read.
//!
//! Implementations:
//!
//! - [`InMemory`](database::InMemory): ephemeral, or persisted as JSON
//!   documents in a data directory
//! - [`SqlxBackend`](database::SqlxBackend): SQLite or PostgreSQL via sqlx
//!
//! All backends return records in creation order.

use std::any::Any;

use async_trait::async_trait;

use crate::Result;
use crate::record::{Element, ElementPatch, ElementSyncInput, Item};

pub mod database;
pub mod errors;

pub use errors::BackendError;

/// Storage port for the two record collections.
///
/// All implementations must be `Send` and `Sync` to be shared across request
/// handlers, and implement `Any` to allow downcasting when needed.
#[async_trait]
pub trait BackendImpl: Send + Sync + Any {
    /// All items, oldest first.
    async fn list_items(&self) -> Result<Vec<Item>>;

    /// The item with the given id, if any.
    async fn get_item(&self, id: &str) -> Result<Option<Item>>;

    /// Inserts the item, or replaces the stored item with the same id.
    /// A replaced item keeps its position in the creation order.
    async fn put_item(&self, item: Item) -> Result<()>;

    /// Removes the item; returns whether it existed.
    async fn remove_item(&self, id: &str) -> Result<bool>;

    /// Removes all items; returns how many were removed.
    async fn clear_items(&self) -> Result<usize>;

    /// All elements, oldest first.
    async fn list_elements(&self) -> Result<Vec<Element>>;

    /// The stored elements among `guids`. Unknown guids are skipped.
    async fn get_elements(&self, guids: &[String]) -> Result<Vec<Element>>;

    /// The element with the given guid, if any.
    async fn get_element(&self, guid: &str) -> Result<Option<Element>> {
        let mut found = self.get_elements(&[guid.to_string()]).await?;
        Ok(found.pop())
    }

    /// Reconciles normalized sync inputs with the stored elements.
    ///
    /// Inputs are applied in order with the rules of
    /// [`merge_sync`](crate::record::merge_sync), each one atomically
    /// against the current record for its guid, so an earlier input of the
    /// same batch counts as current. `yearAdded` and `comment` are never
    /// written. Returns the resulting record for every input, in order.
    async fn sync_elements(
        &self,
        inputs: &[ElementSyncInput],
        now: &str,
    ) -> Result<Vec<Element>>;

    /// Atomically applies an editor annotation and sets `updatedAt` to
    /// `now`. Returns `None` for an unknown guid.
    async fn annotate_element(
        &self,
        guid: &str,
        patch: &ElementPatch,
        now: &str,
    ) -> Result<Option<Element>>;

    /// Short name of the storage kind, reported by the health check.
    fn kind(&self) -> &'static str;

    /// Returns a reference to the backend as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}
