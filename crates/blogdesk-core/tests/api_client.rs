//! End-to-end checks of `ApiClient` + `SessionManager` against an
//! in-process server speaking the blog API's auth endpoints.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use blogdesk_core::auth::credentials::{CredentialStore, MemoryStore, TOKEN_KEY, USER_KEY};
use blogdesk_core::auth::{navigate, AuthError, Navigation, Route};
use blogdesk_core::models::UserProfile;
use blogdesk_core::{ApiClient, AuthBackend, SessionManager};

async fn login(Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match (username, password) {
        ("bob", "secret") => Json(json!({
            "token": "t1",
            "id": 1,
            "username": "bob",
            "email": "bob@example.com",
            "roles": ["ROLE_USER"]
        }))
        .into_response(),
        ("silent", _) => StatusCode::UNAUTHORIZED.into_response(),
        ("garbled", _) => (StatusCode::OK, "not json").into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid credentials"})),
        )
            .into_response(),
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    match body["username"].as_str().unwrap_or_default() {
        "taken" => (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Username is already taken!"})),
        )
            .into_response(),
        "tokenless" => Json(json!({
            "id": 9,
            "username": "tokenless",
            "email": body["email"]
        }))
        .into_response(),
        username => Json(json!({
            "token": "t-new",
            "id": 2,
            "username": username,
            "email": body["email"],
            "roles": ["ROLE_USER"]
        }))
        .into_response(),
    }
}

/// Start the fake server and return its API base URL.
async fn spawn_server() -> String {
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });
    format!("http://{}/api", addr)
}

fn session(base_url: &str, store: &MemoryStore) -> SessionManager {
    let client = ApiClient::new(base_url).expect("Failed to build client");
    SessionManager::new(Box::new(store.clone()), Box::new(client))
}

#[tokio::test]
async fn test_login_round_trip_through_http() {
    let base_url = spawn_server().await;
    let store = MemoryStore::new();
    let manager = session(&base_url, &store);
    manager.initialize();

    assert_eq!(navigate("/posts", &manager.snapshot()), Navigation::Redirect("/login"));

    let user = manager.login("bob", "secret").await.expect("login should succeed");
    assert_eq!(user.id, 1);
    assert!(user.has_role("ROLE_USER"));

    assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("t1"));
    let stored: UserProfile = serde_json::from_str(&store.get(USER_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(stored, user);
    assert_eq!(
        navigate("/posts", &manager.snapshot()),
        Navigation::Render(Route::Posts)
    );
}

#[tokio::test]
async fn test_restart_restores_session() {
    let base_url = spawn_server().await;
    let store = MemoryStore::new();

    let first = session(&base_url, &store);
    first.initialize();
    first.login("bob", "secret").await.unwrap();
    drop(first);

    let second = session(&base_url, &store);
    let snapshot = second.initialize();
    assert!(snapshot.is_authenticated());
    assert_eq!(snapshot.user().map(|u| u.username.as_str()), Some("bob"));
}

#[tokio::test]
async fn test_login_rejection_message_from_server() {
    let base_url = spawn_server().await;
    let store = MemoryStore::new();
    let manager = session(&base_url, &store);
    manager.initialize();

    let err = manager.login("bob", "wrong").await.unwrap_err();
    assert_eq!(
        err,
        AuthError::Rejected {
            status: Some(401),
            message: Some("Invalid credentials".to_string()),
        }
    );
    assert_eq!(err.user_message(), "Invalid credentials");
    assert!(!manager.snapshot().is_authenticated());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_login_rejection_without_body_uses_fallback() {
    let base_url = spawn_server().await;
    let manager = session(&base_url, &MemoryStore::new());
    manager.initialize();

    let err = manager.login("silent", "whatever").await.unwrap_err();
    assert_eq!(err.user_message(), "Invalid username or password");
}

#[tokio::test]
async fn test_undecodable_success_is_invalid_response() {
    let base_url = spawn_server().await;
    let client = ApiClient::new(&base_url).unwrap();
    let request = blogdesk_core::models::LoginRequest {
        username: "garbled".to_string(),
        password: "x".to_string(),
    };
    let err = client.login(&request).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidResponse(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_register_signs_in() {
    let base_url = spawn_server().await;
    let store = MemoryStore::new();
    let manager = session(&base_url, &store);
    manager.initialize();

    let user = manager
        .register("carol", "carol@example.com", "secret")
        .await
        .expect("register should succeed");
    assert_eq!(user.username, "carol");
    assert_eq!(user.email.as_deref(), Some("carol@example.com"));
    assert!(manager.snapshot().is_authenticated());
    assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("t-new"));
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let base_url = spawn_server().await;
    let manager = session(&base_url, &MemoryStore::new());
    manager.initialize();

    let err = manager
        .register("taken", "taken@example.com", "secret")
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Username is already taken!");
    assert!(!manager.snapshot().is_authenticated());
}

#[tokio::test]
async fn test_register_without_token_does_not_sign_in() {
    let base_url = spawn_server().await;
    let store = MemoryStore::new();
    let manager = session(&base_url, &store);
    manager.initialize();

    let err = manager
        .register("tokenless", "t@example.com", "secret")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidResponse(_)));
    assert!(!manager.snapshot().is_authenticated());
    assert!(store.is_empty());
}
