//! Stateless signed bearer tokens.
//!
//! A token is the standard base64 encoding of `payload.signature`, where
//! `payload` is the JSON `{"email", "exp"}` and `signature` is the lowercase
//! hex HMAC-SHA256 of the payload keyed by the server secret. `exp` is in
//! milliseconds since the Unix epoch.

use std::time::Duration;

use base64ct::{Base64, Encoding};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::Clock;

type HmacSha256 = Hmac<Sha256>;

/// Default token lifetime: one hour.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_millis(3_600_000);

/// Identity and expiry carried inside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub email: String,
    pub exp: u64,
}

/// Issues a token for `email` that expires `ttl` from now.
pub fn issue_token(email: &str, secret: &str, ttl: Duration, clock: &dyn Clock) -> String {
    let ttl_millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
    let payload = TokenPayload {
        email: email.to_string(),
        exp: clock.now_millis().saturating_add(ttl_millis),
    };
    // Serializing a struct of a string and an integer cannot fail.
    let body = serde_json::to_string(&payload).unwrap_or_default();
    let signature = sign(&body, secret);
    Base64::encode_string(format!("{body}.{signature}").as_bytes())
}

/// Verifies a token and returns its payload.
///
/// Returns `None` for anything that is not a well-formed, correctly signed,
/// unexpired token.
pub fn verify_token(token: &str, secret: &str, clock: &dyn Clock) -> Option<TokenPayload> {
    let decoded = Base64::decode_vec(token).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (body, signature) = decoded.rsplit_once('.')?;
    if body.is_empty() || signature.is_empty() {
        return None;
    }

    let payload: TokenPayload = serde_json::from_str(body).ok()?;
    if payload.exp < clock.now_millis() {
        return None;
    }

    let expected = sign(body, secret);
    if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
        return None;
    }
    Some(payload)
}

fn sign(body: &str, secret: &str) -> String {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        unreachable!("HMAC accepts keys of any length");
    };
    mac.update(body.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Length mismatch is reported as "no match" without comparing contents.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}
