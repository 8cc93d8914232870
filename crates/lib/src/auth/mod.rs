//! Bearer-token authentication.
//!
//! Tokens are self-contained: identity and expiry travel inside the token
//! and are protected by an HMAC keyed with the server secret, so no session
//! state is stored. Two gates are built on top:
//!
//! - **authenticated**: any valid, unexpired token
//! - **editor**: a valid token whose email is the configured editor
//!
//! Login checks an email/password pair against the configured
//! [`Credentials`] and issues a token through the [`AccessGuard`].

pub mod credentials;
pub mod errors;
pub mod guard;
pub mod token;

pub use credentials::{Credential, Credentials};
pub use errors::AuthError;
pub use guard::AccessGuard;
pub use token::{DEFAULT_TOKEN_TTL, TokenPayload, issue_token, verify_token};
