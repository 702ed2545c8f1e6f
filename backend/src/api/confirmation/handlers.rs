//! Handler functions for the email confirmation flow.

use crate::api::common::{ApiResponse, service_error_to_http};
use crate::config::Config;
use crate::database::models::{ResendConfirmationRequest, User};
use crate::services::user_service::UserService;
use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;

/// Handle a resend-confirmation request for an email address
#[axum::debug_handler]
pub async fn resend_confirmation(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<ResendConfirmationRequest>,
) -> Result<ResponseJson<ApiResponse<User>>, (StatusCode, String)> {
    let user_service = UserService::new(&pool, &config);

    match user_service.resend_confirmation(&payload.email).await {
        Ok(user) => Ok(ResponseJson(ApiResponse::success(
            user,
            "Confirmation email sent",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle confirmation via the emailed token
#[axum::debug_handler]
pub async fn confirm(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Path(token): Path<String>,
) -> Result<ResponseJson<ApiResponse<User>>, (StatusCode, String)> {
    let user_service = UserService::new(&pool, &config);

    match user_service.confirm_by_token(&token).await {
        Ok(user) => Ok(ResponseJson(ApiResponse::success(user, "Email confirmed"))),
        Err(error) => Err(service_error_to_http(error)),
    }
}
