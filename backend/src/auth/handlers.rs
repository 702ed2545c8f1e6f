//! Handler functions for authentication-related API endpoints.
//!
//! These functions process incoming HTTP requests for login, logout, and
//! session introspection, parse request data, and interact with the
//! `auth::service` for core business logic.

use crate::api::common::{ApiResponse, service_error_to_http};
use crate::auth::models::{LoginRequest, LoginResponse, UserInfo};
use crate::auth::service::AuthService;
use crate::config::Config;
use crate::utils::jwt::Claims;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<LoginResponse>>, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &config);

    match auth_service.login(payload).await {
        Ok(response) => Ok(ResponseJson(ApiResponse::success(response, "Logged in"))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle logout request.
///
/// Sessions are stateless JWTs: an authenticated caller is acknowledged and
/// expected to discard the token; an anonymous caller is a no-op.
#[axum::debug_handler]
pub async fn logout(
    Extension(claims): Extension<Option<Claims>>,
) -> ResponseJson<ApiResponse<()>> {
    match claims {
        Some(claims) => {
            tracing::info!(user_id = %claims.user_id(), "user logged out");
            ResponseJson(ApiResponse::success((), "Logged out"))
        }
        None => ResponseJson(ApiResponse::success((), "No active session")),
    }
}

/// Handle session introspection for the authenticated user
#[axum::debug_handler]
pub async fn me(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Extension(claims): Extension<Claims>,
) -> Result<ResponseJson<ApiResponse<UserInfo>>, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &config);

    match auth_service.current_user(&claims).await {
        Ok(user) => Ok(ResponseJson(ApiResponse::ok(user))),
        Err(error) => Err(service_error_to_http(error)),
    }
}
