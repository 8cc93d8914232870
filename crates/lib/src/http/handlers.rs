use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::error::{ApiError, invalid_payload};
use super::extract::{Authenticated, Editor};
use super::{
    AppState, ClearedResponse, DeletedResponse, ElementResponse, ElementsResponse,
    HealthResponse, ItemResponse, ItemsResponse, LoginResponse, UserInfo,
};
use crate::normalize::ValidationError;
use crate::record::{ElementPatch, ElementSyncInput, ItemPayload};
use crate::store::StoreError;

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        backend: state.instance.backend().kind().to_string(),
    })
}

pub(crate) async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(body) = body.map_err(invalid_payload)?;
    let email = body.email.as_deref().map(str::trim).unwrap_or_default();
    let password = body.password.as_deref().unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials.into());
    }

    let account = state
        .credentials
        .authenticate(email, password)
        .inspect_err(|_| warn!(email, "failed login"))?;
    let token = state.guard.issue(account);
    info!(email = account, "login");
    Ok(Json(LoginResponse {
        user: UserInfo {
            email: account.to_string(),
        },
        token,
    }))
}

pub(crate) async fn list_items(
    _auth: Authenticated,
    State(state): State<AppState>,
) -> ApiResult<ItemsResponse> {
    let items = state.instance.items().list().await?;
    Ok(Json(ItemsResponse { items }))
}

pub(crate) async fn add_item(
    _auth: Authenticated,
    State(state): State<AppState>,
    body: Result<Json<ItemPayload>, JsonRejection>,
) -> ApiResult<ItemResponse> {
    let Json(payload) = body.map_err(invalid_payload)?;
    let item = state.instance.items().add(payload.into_new_item()?).await?;
    Ok(Json(ItemResponse { item }))
}

pub(crate) async fn update_item(
    _auth: Authenticated,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ItemPayload>, JsonRejection>,
) -> ApiResult<ItemResponse> {
    let Json(payload) = body.map_err(invalid_payload)?;
    let item = state
        .instance
        .items()
        .update(&id, payload.into_patch()?)
        .await?;
    Ok(Json(ItemResponse { item }))
}

pub(crate) async fn remove_item(
    _auth: Authenticated,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DeletedResponse> {
    if !state.instance.items().remove(&id).await? {
        return Err(StoreError::ItemNotFound { id }.into());
    }
    Ok(Json(DeletedResponse { deleted: true, id }))
}

pub(crate) async fn clear_items(
    _auth: Authenticated,
    State(state): State<AppState>,
) -> ApiResult<ClearedResponse> {
    let count = state.instance.items().clear().await?;
    Ok(Json(ClearedResponse {
        cleared: true,
        count,
    }))
}

pub(crate) async fn list_elements(
    _auth: Authenticated,
    State(state): State<AppState>,
) -> ApiResult<ElementsResponse> {
    let elements = state.instance.elements().list().await?;
    Ok(Json(ElementsResponse { elements }))
}

pub(crate) async fn sync_elements(
    _auth: Authenticated,
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ElementsResponse> {
    let Json(body) = body.map_err(invalid_payload)?;
    let Some(entries) = body.get("elements").and_then(Value::as_array) else {
        return Err(ValidationError::MissingElements.into());
    };
    let inputs = entries.iter().map(ElementSyncInput::from_value).collect();
    let elements = state.instance.elements().sync(inputs).await?;
    Ok(Json(ElementsResponse { elements }))
}

pub(crate) async fn update_element(
    Editor(editor): Editor,
    State(state): State<AppState>,
    Path(guid): Path<String>,
    body: Result<Json<ElementPatch>, JsonRejection>,
) -> ApiResult<ElementResponse> {
    let Json(patch) = body.map_err(invalid_payload)?;
    let element = state.instance.elements().update(&guid, patch).await?;
    info!(guid, editor = %editor.email, "annotated element");
    Ok(Json(ElementResponse { element }))
}
