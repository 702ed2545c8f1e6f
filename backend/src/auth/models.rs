//! Data structures for authentication-related entities.
//!
//! This module defines the login request/response payloads and the session
//! user view returned to authenticated callers.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request payload
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Login response containing the session token and user info
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserInfo,
    /// Token expiration in seconds
    pub expires_in: u64,
}

/// User information returned in login and session introspection responses
#[derive(Debug, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub confirmed: bool,
}
