//! Record stores.
//!
//! Stores are short-lived handles borrowed from an [`Instance`](crate::Instance)
//! via [`Instance::items`](crate::Instance::items) and
//! [`Instance::elements`](crate::Instance::elements). Item mutations hold the
//! instance writer gate from their first read to their final write; element
//! mutations are single atomic backend calls.

mod elements;
mod errors;
mod items;

pub use elements::Elements;
pub use errors::StoreError;
pub use items::Items;
