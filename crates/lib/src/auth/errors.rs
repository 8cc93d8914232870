//! Authentication error types.

use thiserror::Error as ThisError;

use crate::Error;

/// Errors raised by the access gates and the login check.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum AuthError {
    /// No token, or the token is malformed, expired or badly signed.
    #[error("Unauthorized")]
    Unauthenticated,

    /// A valid token whose holder is not the configured editor.
    #[error("Forbidden")]
    Forbidden,

    /// Login with an unknown email or a wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A configured account could not be parsed.
    #[error("Invalid user entry: {reason}")]
    InvalidCredentialEntry {
        /// Description of why the entry is invalid
        reason: String,
    },
}

impl AuthError {
    /// Check if this error should be answered with 401.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::Unauthenticated | AuthError::InvalidCredentials
        )
    }

    /// Check if this error should be answered with 403.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, AuthError::Forbidden)
    }

    /// Check if this error comes from server configuration rather than a request.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, AuthError::InvalidCredentialEntry { .. })
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        Error::Auth(err)
    }
}
