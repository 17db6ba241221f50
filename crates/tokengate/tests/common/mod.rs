//! Test utilities and common setup.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, header},
};
use serde_json::Value;
use tokengate::api::{self, AppState};
use tokengate::auth::{AuthConfig, SigningAlgorithm};
use tokengate::store::{CredentialStore, InMemoryCredentialStore, UserRecord};

/// bcrypt("admin"), cost 4.
pub const ADMIN_HASH: &str = "$2b$04$ZTMHOhr6j96io16S.YjODO/6FyYak9EYDXrva23/r6rSk1zys3i/q";
/// bcrypt("user"), cost 4.
pub const USER_HASH: &str = "$2b$04$34PCKUFzL2g4h.ixx6nXbe1X0e9S5aSze9Qkf0exhx53xau/Dvn66";

pub const TEST_SECRET: &str = "test-secret-for-integration-tests-minimum-32-chars";

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// HS256 config with a fixed secret and cost-4 hashing.
pub fn test_auth_config() -> AuthConfig {
    let mut config = AuthConfig::default();
    config.jwt_secret = Some(TEST_SECRET.to_string());
    config.hash_workers = 2;
    config.password_hash_cost = 4;
    config
}

/// RS256 config using the fixture key pair.
pub fn rsa_auth_config() -> AuthConfig {
    let mut config = test_auth_config();
    config.algorithm = SigningAlgorithm::Rs256;
    config.jwt_secret = None;
    config.private_key_path = Some(fixture("rsa_private.pem"));
    config.public_key_path = Some(fixture("rsa_public.pem"));
    config
}

/// The two demo users: admin/admin with ADMIN, user/user with USER.
pub fn demo_users() -> Vec<UserRecord> {
    vec![
        UserRecord::new("admin", ADMIN_HASH, ["ADMIN"]),
        UserRecord::new("user", USER_HASH, ["USER"]),
    ]
}

/// Application state over `users`.
pub fn test_state_with(config: &AuthConfig, users: Vec<UserRecord>) -> AppState {
    let store: Arc<dyn CredentialStore> = Arc::new(InMemoryCredentialStore::new(users).unwrap());
    AppState::from_config(config, store).unwrap()
}

pub fn test_state() -> AppState {
    test_state_with(&test_auth_config(), demo_users())
}

/// Create a test application seeded with the demo users.
pub fn test_app() -> Router {
    api::create_router(test_state())
}

pub fn login_request(username: &str, password: &str) -> Request<Body> {
    let body = serde_json::json!({ "username": username, "password": password });
    Request::builder()
        .uri("/api/v1/auth/login")
        .method(Method::POST)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).method(Method::GET);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
