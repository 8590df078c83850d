//! Request and response bodies of the backend auth contract

use serde::{Deserialize, Serialize};

/// Sign-in request
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body returned by both login and refresh
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Access token for the `Authorization: Bearer` header
    pub token: String,
}

/// Account registration request
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Account created by registration
///
/// The backend does not issue a session token on registration; a sign-in has
/// to follow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}
