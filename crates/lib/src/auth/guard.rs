//! The two access gates: authenticated, and authenticated editor.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::errors::AuthError;
use super::token::{DEFAULT_TOKEN_TTL, TokenPayload, issue_token, verify_token};
use crate::Clock;

/// Verifies bearer tokens and issues new ones with the server secret.
#[derive(Clone)]
pub struct AccessGuard {
    secret: String,
    editor_email: Option<String>,
    token_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGuard")
            .field("editor_email", &self.editor_email)
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

impl AccessGuard {
    pub fn new(secret: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: secret.into(),
            editor_email: None,
            token_ttl: DEFAULT_TOKEN_TTL,
            clock,
        }
    }

    /// Sets the single account allowed through [`require_editor`](Self::require_editor).
    pub fn with_editor(mut self, email: impl Into<String>) -> Self {
        let email = email.into();
        self.editor_email = Some(email.trim().to_string()).filter(|e| !e.is_empty());
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn editor_email(&self) -> Option<&str> {
        self.editor_email.as_deref()
    }

    /// Issues a token for `email` with the configured lifetime.
    pub fn issue(&self, email: &str) -> String {
        issue_token(email, &self.secret, self.token_ttl, self.clock.as_ref())
    }

    /// Checks an `Authorization` header value. A `Bearer ` prefix is optional.
    pub fn require_auth(&self, header: Option<&str>) -> Result<TokenPayload, AuthError> {
        let header = header.ok_or(AuthError::Unauthenticated)?;
        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
        if token.is_empty() {
            return Err(AuthError::Unauthenticated);
        }
        verify_token(token, &self.secret, self.clock.as_ref()).ok_or_else(|| {
            debug!("rejected bearer token");
            AuthError::Unauthenticated
        })
    }

    /// Like [`require_auth`](Self::require_auth), and the token must belong to
    /// the editor (email compared case-insensitively).
    pub fn require_editor(&self, header: Option<&str>) -> Result<TokenPayload, AuthError> {
        let payload = self.require_auth(header)?;
        match &self.editor_email {
            Some(editor) if editor.to_lowercase() == payload.email.to_lowercase() => Ok(payload),
            _ => Err(AuthError::Forbidden),
        }
    }
}
