//! Handler functions for the password reset flow.

use crate::api::common::{ApiResponse, service_error_to_http};
use crate::config::Config;
use crate::database::models::{ForgotPasswordRequest, ResetPasswordRequest, User};
use crate::services::user_service::UserService;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;

/// Handle a forgot-password request: sends a reset email to a confirmed
/// account
#[axum::debug_handler]
pub async fn forgot_password(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<ResponseJson<ApiResponse<User>>, (StatusCode, String)> {
    let user_service = UserService::new(&pool, &config);

    match user_service.forgot_password(&payload.email).await {
        Ok(user) => Ok(ResponseJson(ApiResponse::success(
            user,
            "Password reset email sent",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle completion of a password reset via the emailed token
#[axum::debug_handler]
pub async fn reset_password(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<ResponseJson<ApiResponse<User>>, (StatusCode, String)> {
    let user_service = UserService::new(&pool, &config);

    match user_service.reset_password(payload).await {
        Ok(user) => Ok(ResponseJson(ApiResponse::success(user, "Password updated"))),
        Err(error) => Err(service_error_to_http(error)),
    }
}
