/**
 * Authentication Handler Types
 *
 * Request and response bodies for registration and login.
 */

use serde::{Deserialize, Serialize};

use crate::shared::messaging::UserSummary;

/// Register request
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct RegisterRequest {
    /// Display name (1-50 characters)
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Plain password, at least 8 characters; hashed before storage
    #[serde(default)]
    pub password: String,
}

/// Login request
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Returned by register and login
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub message: String,
    /// Bearer token for the REST API and the live channel `join`
    pub token: String,
    pub user: UserSummary,
}
