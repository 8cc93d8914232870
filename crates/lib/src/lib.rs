//!
//! houseview: persistence and authorization for a 3D house viewer.
//!
//! ## Core Concepts
//!
//! * **Items (`record::Item`)**: user-placed points of interest with a 3D
//!   position and the rooms they belong to.
//! * **Elements (`record::Element`)**: building-component metadata keyed by
//!   a BIM `guid`, refreshed by bulk sync and annotated by an editor.
//! * **Backends (`backend::BackendImpl`)**: pluggable storage, either JSON
//!   documents ([`backend::database::InMemory`]) or SQL
//!   (`backend::database::SqlxBackend`).
//! * **Instance (`Instance`)**: owns the backend, the clock and the writer
//!   gate; hands out the item and element stores.
//! * **Auth (`auth`)**: HMAC-signed bearer tokens with an authenticated and
//!   an editor gate.
//! * **HTTP (`http`)**: the axum router exposing all of the above.

pub mod auth;
pub mod backend;
pub mod clock;
pub mod http;
pub mod instance;
pub mod normalize;
pub mod record;
pub mod store;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "testing"))]
pub use clock::{ClockHold, FixedClock};
pub use instance::Instance;

/// Result type used throughout the houseview library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the houseview library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Rejected client input
    #[error(transparent)]
    Validation(#[from] normalize::ValidationError),

    /// Structured authentication errors from the auth module
    #[error(transparent)]
    Auth(auth::AuthError),

    /// Missing records from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured storage errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),
}

impl Error {
    /// Get the module name where this error originated.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
            Error::Validation(_) => "normalize",
            Error::Auth(_) => "auth",
            Error::Store(_) => "store",
            Error::Backend(_) => "backend",
        }
    }

    /// Check if this error indicates a record was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is rejected client input.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if the caller is not (or no longer) authenticated.
    pub fn is_unauthenticated(&self) -> bool {
        match self {
            Error::Auth(auth_err) => auth_err.is_unauthenticated(),
            _ => false,
        }
    }

    /// Check if the caller is authenticated but not allowed.
    pub fn is_forbidden(&self) -> bool {
        match self {
            Error::Auth(auth_err) => auth_err.is_forbidden(),
            _ => false,
        }
    }

    /// Check if this error came from the storage backend.
    pub fn is_backend_error(&self) -> bool {
        matches!(self, Error::Backend(_))
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) | Error::Serialize(_) => true,
            Error::Backend(backend_err) => backend_err.is_io_error(),
            _ => false,
        }
    }
}
