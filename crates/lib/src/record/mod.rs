//! Record types and the boundary payloads that produce them.

pub mod element;
pub mod item;

pub use element::{Element, ElementPatch, ElementSyncInput, merge_sync};
pub use item::{Item, ItemPatch, ItemPayload, NewItem, generate_item_id};
