//! Storage error types.

use thiserror::Error;

/// Errors raised by a storage backend.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error on {path}")]
    FileIo {
        /// The file being read or written
        path: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A database query failed.
    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("SQL error: {reason}")]
    SqlxError {
        /// What was being done, plus the driver message
        reason: String,
        /// The underlying sqlx error
        #[source]
        source: Option<sqlx::Error>,
    },

    /// The backend configuration cannot be used.
    #[error("Invalid backend configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the problem
        reason: String,
    },
}

impl BackendError {
    /// Check if this error is related to file I/O or (de)serialization.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            BackendError::FileIo { .. } | BackendError::SerializationFailed { .. }
        )
    }

    /// Check if this error came from the SQL driver.
    pub fn is_sql_error(&self) -> bool {
        #[cfg(any(feature = "sqlite", feature = "postgres"))]
        if matches!(self, BackendError::SqlxError { .. }) {
            return true;
        }
        false
    }

    /// Check if this error is a configuration problem.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, BackendError::InvalidConfiguration { .. })
    }
}

impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
