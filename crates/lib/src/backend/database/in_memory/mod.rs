//! In-memory backend, optionally persisted as JSON documents.
//!
//! [`InMemory::new`] keeps everything in memory and is meant for tests.
//! [`InMemory::open`] mirrors each collection to a JSON document in a data
//! directory (`items.json`, `elements.json`). The documents are loaded
//! lazily on first access; the load runs once even under concurrent first
//! calls. Every mutation rewrites the affected document before the new
//! state becomes visible. Element sync and annotation run under the
//! collection's write lock, which makes this process the single writer of
//! its documents.

mod persistence;

use std::any::Any;
use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::{OnceCell, RwLock};
use tracing::info;

use crate::backend::BackendImpl;
use crate::record::{Element, ElementPatch, ElementSyncInput, Item, merge_sync};
use crate::{Error, Result};

use persistence::Documents;
pub use persistence::{ELEMENTS_FILE, ITEMS_FILE};

/// A simple in-memory backend.
#[derive(Debug)]
pub struct InMemory {
    items: RwLock<Vec<Item>>,
    elements: RwLock<Vec<Element>>,
    documents: Option<Documents>,
    loaded: OnceCell<()>,
}

impl InMemory {
    /// Creates a new, empty backend that is never written to disk.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            elements: RwLock::new(Vec::new()),
            documents: None,
            loaded: OnceCell::new(),
        }
    }

    /// Creates a backend persisted in `dir`.
    ///
    /// Nothing is read until the first operation; missing documents are
    /// created then.
    pub fn open(dir: impl AsRef<Path>) -> Self {
        Self {
            documents: Some(Documents::in_dir(dir.as_ref())),
            ..Self::new()
        }
    }

    /// The data directory, if this backend is persisted.
    pub fn data_dir(&self) -> Option<&Path> {
        self.documents.as_ref().map(|docs| docs.dir.as_path())
    }

    async fn ensure_loaded(&self) -> Result<()> {
        self.loaded
            .get_or_try_init(|| async {
                let Some(docs) = &self.documents else {
                    return Ok(());
                };
                let items: Vec<Item> = persistence::load_document(&docs.items).await?;
                let elements: Vec<Element> = persistence::load_document(&docs.elements).await?;
                info!(
                    dir = %docs.dir.display(),
                    items = items.len(),
                    elements = elements.len(),
                    "loaded JSON documents"
                );
                *self.items.write().await = items;
                *self.elements.write().await = elements;
                Ok::<(), Error>(())
            })
            .await?;
        Ok(())
    }

    async fn save_items(&self, items: &[Item]) -> Result<()> {
        match &self.documents {
            Some(docs) => persistence::save_document(&docs.items, items).await,
            None => Ok(()),
        }
    }

    async fn save_elements(&self, elements: &[Element]) -> Result<()> {
        match &self.documents {
            Some(docs) => persistence::save_document(&docs.elements, elements).await,
            None => Ok(()),
        }
    }
}

impl Default for InMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackendImpl for InMemory {
    async fn list_items(&self) -> Result<Vec<Item>> {
        self.ensure_loaded().await?;
        Ok(self.items.read().await.clone())
    }

    async fn get_item(&self, id: &str) -> Result<Option<Item>> {
        self.ensure_loaded().await?;
        let items = self.items.read().await;
        Ok(items.iter().find(|item| item.id == id).cloned())
    }

    async fn put_item(&self, item: Item) -> Result<()> {
        self.ensure_loaded().await?;
        let mut items = self.items.write().await;
        let mut next = items.clone();
        match next.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => next.push(item),
        }
        self.save_items(&next).await?;
        *items = next;
        Ok(())
    }

    async fn remove_item(&self, id: &str) -> Result<bool> {
        self.ensure_loaded().await?;
        let mut items = self.items.write().await;
        let Some(index) = items.iter().position(|item| item.id == id) else {
            return Ok(false);
        };
        let mut next = items.clone();
        next.remove(index);
        self.save_items(&next).await?;
        *items = next;
        Ok(true)
    }

    async fn clear_items(&self) -> Result<usize> {
        self.ensure_loaded().await?;
        let mut items = self.items.write().await;
        let count = items.len();
        self.save_items(&[]).await?;
        items.clear();
        Ok(count)
    }

    async fn list_elements(&self) -> Result<Vec<Element>> {
        self.ensure_loaded().await?;
        Ok(self.elements.read().await.clone())
    }

    async fn get_elements(&self, guids: &[String]) -> Result<Vec<Element>> {
        self.ensure_loaded().await?;
        let elements = self.elements.read().await;
        Ok(elements
            .iter()
            .filter(|element| guids.contains(&element.guid))
            .cloned()
            .collect())
    }

    async fn sync_elements(
        &self,
        inputs: &[ElementSyncInput],
        now: &str,
    ) -> Result<Vec<Element>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure_loaded().await?;
        let mut elements = self.elements.write().await;
        let mut next = elements.clone();
        let mut positions: HashMap<String, usize> = next
            .iter()
            .enumerate()
            .map(|(index, element)| (element.guid.clone(), index))
            .collect();

        let mut touched = Vec::with_capacity(inputs.len());
        for input in inputs {
            match positions.get(&input.guid).copied() {
                Some(index) => {
                    let merged = merge_sync(Some(&next[index]), input, now);
                    next[index] = merged.clone();
                    touched.push(merged);
                }
                None => {
                    let created = merge_sync(None, input, now);
                    positions.insert(created.guid.clone(), next.len());
                    next.push(created.clone());
                    touched.push(created);
                }
            }
        }

        self.save_elements(&next).await?;
        *elements = next;
        Ok(touched)
    }

    async fn annotate_element(
        &self,
        guid: &str,
        patch: &ElementPatch,
        now: &str,
    ) -> Result<Option<Element>> {
        self.ensure_loaded().await?;
        let mut elements = self.elements.write().await;
        let Some(index) = elements.iter().position(|element| element.guid == guid) else {
            return Ok(None);
        };
        let mut next = elements.clone();
        patch.apply(&mut next[index]);
        next[index].updated_at = Some(now.to_string());
        let annotated = next[index].clone();

        self.save_elements(&next).await?;
        *elements = next;
        Ok(Some(annotated))
    }

    fn kind(&self) -> &'static str {
        if self.documents.is_some() {
            "file"
        } else {
            "memory"
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
