//! Login accounts configured at startup.
//!
//! An account is written `email:password`. The password is either plain
//! text or an Argon2 PHC string (`$argon2id$...`), which lets deployments
//! keep clear-text passwords out of their environment.

use std::fmt;
use std::str::FromStr;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::errors::AuthError;

#[derive(Clone)]
enum Secret {
    /// SHA-256 of the plain password; comparing fixed-length digests keeps
    /// the password length out of the timing.
    Plain([u8; 32]),
    Argon2(String),
}

impl Secret {
    fn parse(raw: &str) -> Result<Self, AuthError> {
        if raw.starts_with("$argon2") {
            PasswordHash::new(raw).map_err(|e| AuthError::InvalidCredentialEntry {
                reason: format!("invalid password hash: {e}"),
            })?;
            Ok(Secret::Argon2(raw.to_string()))
        } else {
            Ok(Secret::Plain(Sha256::digest(raw.as_bytes()).into()))
        }
    }

    fn matches(&self, password: &str) -> bool {
        match self {
            Secret::Plain(expected) => {
                let given: [u8; 32] = Sha256::digest(password.as_bytes()).into();
                expected.as_slice().ct_eq(given.as_slice()).into()
            }
            Secret::Argon2(hash) => PasswordHash::new(hash).is_ok_and(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            }),
        }
    }
}

/// One login account.
#[derive(Clone)]
pub struct Credential {
    email: String,
    secret: Secret,
}

impl Credential {
    pub fn new(email: impl Into<String>, password: &str) -> Result<Self, AuthError> {
        let email = email.into().trim().to_string();
        if email.is_empty() {
            return Err(AuthError::InvalidCredentialEntry {
                reason: "email is empty".to_string(),
            });
        }
        if password.is_empty() {
            return Err(AuthError::InvalidCredentialEntry {
                reason: format!("password for {email} is empty"),
            });
        }
        Ok(Self {
            email,
            secret: Secret::parse(password)?,
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl FromStr for Credential {
    type Err = AuthError;

    /// Parses `email:password`, splitting at the first colon.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (email, password) =
            s.split_once(':')
                .ok_or_else(|| AuthError::InvalidCredentialEntry {
                    reason: "expected email:password".to_string(),
                })?;
        Credential::new(email, password)
    }
}

/// The set of accounts allowed to log in.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    accounts: Vec<Credential>,
}

impl Credentials {
    pub fn new(accounts: Vec<Credential>) -> Self {
        Self { accounts }
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns the account's configured email if `email` (any letter case)
    /// and `password` match.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<&str, AuthError> {
        let wanted = email.trim().to_lowercase();
        self.accounts
            .iter()
            .find(|account| account.email.to_lowercase() == wanted)
            .filter(|account| account.secret.matches(password))
            .map(|account| account.email.as_str())
            .ok_or(AuthError::InvalidCredentials)
    }
}

impl FromIterator<Credential> for Credentials {
    fn from_iter<T: IntoIterator<Item = Credential>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
