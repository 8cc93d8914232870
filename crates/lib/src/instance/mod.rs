//! The store owner.
//!
//! An [`Instance`] ties a storage backend to a clock and to the writer gate
//! that serializes item read-modify-writes. Element writes are atomic in the
//! backend and do not take the gate. It is created once
//! at startup and handed to whatever needs the stores (the HTTP router
//! state, tests); there is no global store.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::backend::BackendImpl;
use crate::store::{Elements, Items};
use crate::{Clock, SystemClock};

pub(crate) struct InstanceInternal {
    backend: Arc<dyn BackendImpl>,
    clock: Arc<dyn Clock>,
    write_gate: Mutex<()>,
}

impl std::fmt::Debug for InstanceInternal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceInternal")
            .field("backend", &self.backend.kind())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

/// Handle to the item and element stores.
///
/// Instance is a cheap-to-clone handle around `Arc<InstanceInternal>`.
///
/// ## Example
///
/// ```
/// # use houseview::{backend::database::InMemory, normalize::Position, record::NewItem, Instance};
/// # #[tokio::main]
/// # async fn main() -> houseview::Result<()> {
/// let instance = Instance::open(Box::new(InMemory::new()));
///
/// let lamp = instance
///     .items()
///     .add(NewItem::new("Lamp", Position::new(1.0, 2.0, 0.5)))
///     .await?;
/// assert_eq!(instance.items().list().await?, vec![lamp]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Instance {
    inner: Arc<InstanceInternal>,
}

impl Instance {
    /// Creates an instance over `backend` using the system clock.
    pub fn open(backend: Box<dyn BackendImpl>) -> Self {
        Self::open_impl(backend, Arc::new(SystemClock))
    }

    /// Same as [`Instance::open`] with an injected clock, for controllable
    /// timestamps in tests.
    ///
    /// Only available with the `testing` feature or in test builds.
    #[cfg(any(test, feature = "testing"))]
    pub fn open_with_clock(backend: Box<dyn BackendImpl>, clock: Arc<dyn Clock>) -> Self {
        Self::open_impl(backend, clock)
    }

    fn open_impl(backend: Box<dyn BackendImpl>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(InstanceInternal {
                backend: Arc::from(backend),
                clock,
                write_gate: Mutex::new(()),
            }),
        }
    }

    /// The item store.
    pub fn items(&self) -> Items<'_> {
        Items::new(self)
    }

    /// The element store.
    pub fn elements(&self) -> Elements<'_> {
        Elements::new(self)
    }

    /// Get a reference to the storage backend.
    pub fn backend(&self) -> &dyn BackendImpl {
        &*self.inner.backend
    }

    /// Get a reference to the clock.
    pub fn clock(&self) -> &dyn Clock {
        &*self.inner.clock
    }

    /// Get a cloned Arc of the clock, for components that need ownership.
    pub fn clock_arc(&self) -> Arc<dyn Clock> {
        self.inner.clock.clone()
    }

    /// Waits for exclusive write access to the item store.
    pub(crate) async fn write_gate(&self) -> MutexGuard<'_, ()> {
        self.inner.write_gate.lock().await
    }
}
