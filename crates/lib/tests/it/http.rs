//! The router served on a loopback socket and driven with reqwest.

use std::sync::Arc;

use houseview::{
    FixedClock, Instance,
    auth::{AccessGuard, Credential, Credentials},
    http::{
        AppState, ClearedResponse, DeletedResponse, ElementResponse, ElementsResponse, ErrorBody,
        HealthResponse, ItemResponse, ItemsResponse, LoginResponse, router,
    },
};
use reqwest::{Client, StatusCode};
use serde_json::json;

use crate::helpers::{T0, test_backend};

const EDITOR: &str = "editor@house.io";
const VIEWER: &str = "viewer@house.io";
const PASSWORD: &str = "hunter2";

struct TestServer {
    base: String,
    client: Client,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl TestServer {
    async fn start() -> Self {
        let clock = Arc::new(FixedClock::new(T0));
        let instance = Instance::open_with_clock(test_backend().await, clock.clone());
        let guard = AccessGuard::new("http-test-secret", clock).with_editor(EDITOR);
        let credentials: Credentials = [EDITOR, VIEWER]
            .into_iter()
            .map(|email| Credential::new(email, PASSWORD).unwrap())
            .collect();
        let app = router(AppState::new(instance, guard, credentials));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            client: Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn login(&self, email: &str) -> String {
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({"email": email, "password": PASSWORD}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response.json::<LoginResponse>().await.unwrap().token
    }
}

async fn error_of(response: reqwest::Response) -> String {
    response.json::<ErrorBody>().await.unwrap().error
}

#[tokio::test]
async fn health_needs_no_token() {
    let server = TestServer::start().await;
    let response = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = response.json().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert!(["memory", "sqlite", "postgres"].contains(&health.backend.as_str()));
}

#[tokio::test]
async fn login_outcomes() {
    let server = TestServer::start().await;
    let url = server.url("/api/auth/login");

    let response = server
        .client
        .post(&url)
        .json(&json!({"email": "Viewer@House.io", "password": PASSWORD}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let login: LoginResponse = response.json().await.unwrap();
    assert_eq!(login.user.email, VIEWER);
    assert!(!login.token.is_empty());

    let response = server
        .client
        .post(&url)
        .json(&json!({"email": VIEWER}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(response).await, "Email and password are required");

    let response = server
        .client
        .post(&url)
        .json(&json!({"email": VIEWER, "password": "wrong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(response).await, "Invalid credentials");
}

#[tokio::test]
async fn api_requires_a_valid_token() {
    let server = TestServer::start().await;

    let response = server.client.get(server.url("/api/items")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(response).await, "Unauthorized");

    let response = server
        .client
        .get(server.url("/api/elements"))
        .bearer_auth("bm90LWEtdG9rZW4=")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn item_lifecycle() {
    let server = TestServer::start().await;
    let token = server.login(VIEWER).await;

    let response = server
        .client
        .post(server.url("/api/items"))
        .bearer_auth(&token)
        .json(&json!({
            "name": "  Lamp ",
            "rooms": [" Office ", ""],
            "position": {"x": 1, "y": 2.5, "z": -3}
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = response.json::<ItemResponse>().await.unwrap().item;
    assert_eq!(created.name, "Lamp");
    assert_eq!(created.rooms, vec!["Office"]);
    assert_eq!(created.date_added, "2024-01-01");

    let response = server
        .client
        .put(server.url(&format!("/api/items/{}", created.id)))
        .bearer_auth(&token)
        .json(&json!({"description": "brass"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = response.json::<ItemResponse>().await.unwrap().item;
    assert_eq!(updated.description, "brass");
    assert!(updated.updated_at.is_some());

    let listed: ItemsResponse = server
        .client
        .get(server.url("/api/items"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.items, vec![updated]);

    let response = server
        .client
        .delete(server.url(&format!("/api/items/{}", created.id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.json::<DeletedResponse>().await.unwrap(),
        DeletedResponse {
            deleted: true,
            id: created.id.clone()
        }
    );

    let response = server
        .client
        .delete(server.url("/api/items"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(
        response.json::<ClearedResponse>().await.unwrap(),
        ClearedResponse {
            cleared: true,
            count: 0
        }
    );
}

#[tokio::test]
async fn clear_alias_removes_everything() {
    let server = TestServer::start().await;
    let token = server.login(VIEWER).await;
    for name in ["a", "b"] {
        let response = server
            .client
            .post(server.url("/api/items"))
            .bearer_auth(&token)
            .json(&json!({"name": name, "position": {"x": 0, "y": 0, "z": 0}}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = server
        .client
        .delete(server.url("/api/items/clear"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.json::<ClearedResponse>().await.unwrap(),
        ClearedResponse {
            cleared: true,
            count: 2
        }
    );
}

#[tokio::test]
async fn item_rejections() {
    let server = TestServer::start().await;
    let token = server.login(VIEWER).await;

    let response = server
        .client
        .post(server.url("/api/items"))
        .bearer_auth(&token)
        .json(&json!({"name": "Lamp", "position": {"x": 1, "y": "2", "z": 3}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_of(response).await,
        "Position must include numeric x, y, z"
    );

    let response = server
        .client
        .put(server.url("/api/items/unknown"))
        .bearer_auth(&token)
        .json(&json!({"name": "Lamp"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(response).await, "Item not found");

    let response = server
        .client
        .delete(server.url("/api/items/unknown"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn element_sync_and_annotation() {
    let server = TestServer::start().await;
    let viewer = server.login(VIEWER).await;
    let editor = server.login(EDITOR).await;

    let response = server
        .client
        .post(server.url("/api/elements/sync"))
        .bearer_auth(&viewer)
        .json(&json!({"items": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(response).await, "Elements array required");

    let response = server
        .client
        .post(server.url("/api/elements/sync"))
        .bearer_auth(&viewer)
        .json(&json!({"elements": [
            {"guid": "w-1", "revitId": 4512, "name": "Basic Wall", "type": "Walls", "material": "Concrete"},
            {"guid": "w-2", "revitId": "4513", "name": "Basic Wall"},
            {"guid": "", "name": "dropped"},
            "not an object"
        ]}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let synced = response.json::<ElementsResponse>().await.unwrap().elements;
    assert_eq!(synced.len(), 2);
    assert_eq!(synced[0].revit_id, 4512);
    // Only JSON numbers are taken as ids.
    assert_eq!(synced[1].revit_id, 0);

    let annotation = json!({"yearAdded": "1998", "comment": "load bearing"});
    let response = server
        .client
        .put(server.url("/api/elements/w-1"))
        .bearer_auth(&viewer)
        .json(&annotation)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_of(response).await, "Forbidden");

    let response = server
        .client
        .put(server.url("/api/elements/w-1"))
        .bearer_auth(&editor)
        .json(&annotation)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let element = response.json::<ElementResponse>().await.unwrap().element;
    assert_eq!(element.year_added, "1998");
    assert_eq!(element.comment, "load bearing");

    let response = server
        .client
        .put(server.url("/api/elements/w-404"))
        .bearer_auth(&editor)
        .json(&annotation)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(response).await, "Element not found");

    let listed: ElementsResponse = server
        .client
        .get(server.url("/api/elements"))
        .bearer_auth(&viewer)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.elements, vec![element, synced[1].clone()]);
}
