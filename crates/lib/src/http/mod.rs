//! HTTP surface.
//!
//! Thin axum handlers over the stores and the access gates. Bodies are JSON;
//! every failure is answered with `{"error": message}` and a status derived
//! from the error kind (400 validation, 401 unauthenticated, 403 forbidden,
//! 404 not found, 500 storage).
//!
//! | Route | Gate |
//! |---|---|
//! | `GET /health` | none |
//! | `POST /api/auth/login` | none |
//! | `GET, POST, DELETE /api/items` | authenticated |
//! | `DELETE /api/items/clear` | authenticated |
//! | `PUT, DELETE /api/items/{id}` | authenticated |
//! | `GET /api/elements` | authenticated |
//! | `POST /api/elements/sync` | authenticated |
//! | `PUT /api/elements/{guid}` | editor |

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};

use crate::Instance;
use crate::auth::{AccessGuard, Credentials};
use crate::record::{Element, Item};

mod error;
mod extract;
mod handlers;

pub use error::{ApiError, ErrorBody};
pub use extract::{Authenticated, Editor};

/// Shared state of all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub instance: Instance,
    pub guard: Arc<AccessGuard>,
    pub credentials: Arc<Credentials>,
}

impl AppState {
    pub fn new(instance: Instance, guard: AccessGuard, credentials: Credentials) -> Self {
        Self {
            instance,
            guard: Arc::new(guard),
            credentials: Arc::new(credentials),
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/login", post(handlers::login))
        .route(
            "/items",
            get(handlers::list_items)
                .post(handlers::add_item)
                .delete(handlers::clear_items),
        )
        // Path used by the viewer; ids are never five characters long.
        .route("/items/clear", delete(handlers::clear_items))
        .route(
            "/items/{id}",
            put(handlers::update_item).delete(handlers::remove_item),
        )
        .route("/elements", get(handlers::list_elements))
        .route("/elements/sync", post(handlers::sync_elements))
        .route("/elements/{guid}", put(handlers::update_element));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .with_state(state)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserInfo,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsResponse {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResponse {
    pub item: Item,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: bool,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearedResponse {
    pub cleared: bool,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementsResponse {
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementResponse {
    pub element: Element,
}
