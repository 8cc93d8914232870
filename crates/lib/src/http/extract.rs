//! Extractors for the two access gates.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AppState, error::ApiError};
use crate::auth::TokenPayload;

fn authorization(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// Any caller holding a valid token.
#[derive(Debug, Clone)]
pub struct Authenticated(pub TokenPayload);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        Ok(Self(state.guard.require_auth(authorization(parts))?))
    }
}

/// The configured editor.
#[derive(Debug, Clone)]
pub struct Editor(pub TokenPayload);

impl FromRequestParts<AppState> for Editor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        Ok(Self(state.guard.require_editor(authorization(parts))?))
    }
}
