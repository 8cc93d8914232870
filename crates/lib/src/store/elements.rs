use tracing::{debug, info};

use super::errors::StoreError;
use crate::record::{Element, ElementPatch, ElementSyncInput};
use crate::{Instance, Result};

/// Element collection handle.
///
/// Unlike items, element writes take no writer gate: the backend applies
/// each sync input and each annotation atomically, which also holds when
/// several processes share one database.
pub struct Elements<'a> {
    instance: &'a Instance,
}

impl<'a> Elements<'a> {
    pub(crate) fn new(instance: &'a Instance) -> Self {
        Self { instance }
    }

    /// All elements in creation order.
    pub async fn list(&self) -> Result<Vec<Element>> {
        self.instance.backend().list_elements().await
    }

    /// Fetch a single element.
    pub async fn get(&self, guid: &str) -> Result<Element> {
        self.instance
            .backend()
            .get_element(guid)
            .await?
            .ok_or_else(|| {
                StoreError::ElementNotFound {
                    guid: guid.to_string(),
                }
                .into()
            })
    }

    /// Reconciles a batch of element descriptions from the BIM model.
    ///
    /// Inputs are trimmed and those without a guid are dropped. The rest
    /// are merged in order with the rules of
    /// [`merge_sync`](crate::record::merge_sync); an earlier input in the
    /// same batch counts as current. Returns the touched records in input
    /// order.
    pub async fn sync(&self, inputs: Vec<ElementSyncInput>) -> Result<Vec<Element>> {
        let received = inputs.len();
        let inputs: Vec<ElementSyncInput> = inputs
            .into_iter()
            .map(ElementSyncInput::normalized)
            .filter(|input| !input.guid.is_empty())
            .collect();
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let now = self.instance.clock().now_rfc3339();
        let touched = self
            .instance
            .backend()
            .sync_elements(&inputs, &now)
            .await?;
        info!(received, kept = inputs.len(), "synced elements");
        Ok(touched)
    }

    /// Applies an editor annotation and stamps `updatedAt`.
    pub async fn update(&self, guid: &str, patch: ElementPatch) -> Result<Element> {
        let now = self.instance.clock().now_rfc3339();
        let element = self
            .instance
            .backend()
            .annotate_element(guid, &patch.normalized(), &now)
            .await?
            .ok_or_else(|| StoreError::ElementNotFound {
                guid: guid.to_string(),
            })?;
        debug!(guid, "updated element");
        Ok(element)
    }
}
