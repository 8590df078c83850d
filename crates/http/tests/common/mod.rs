#![allow(dead_code)]

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use placer_http::{SessionClient, TokenStore};
use serde_json::{Value, json};
use wiremock::MockServer;

/// Unsigned three-segment token carrying `claims` as its payload
pub fn token_with(claims: Value) -> String {
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(claims.to_string()),
        URL_SAFE_NO_PAD.encode(b"not-a-real-signature"),
    )
}

pub fn token_for(sub: &str) -> String {
    token_with(json!({"sub": sub, "email": format!("{sub}@example.com"), "name": "Test User"}))
}

pub fn client_for(server: &MockServer) -> SessionClient {
    SessionClient::builder()
        .base_url(server.uri())
        .build()
        .unwrap()
}

/// Client pointed at a local port nothing listens on
pub fn unreachable_client(token: Option<&str>) -> SessionClient {
    let tokens = TokenStore::new();
    tokens.set(token.map(str::to_string));
    SessionClient::builder()
        .base_url("http://127.0.0.1:9")
        .token_store(tokens)
        .build()
        .unwrap()
}

pub fn client_with_token(server: &MockServer, token: &str) -> SessionClient {
    let tokens = TokenStore::new();
    tokens.set(Some(token.to_string()));
    SessionClient::builder()
        .base_url(server.uri())
        .token_store(tokens)
        .build()
        .unwrap()
}
