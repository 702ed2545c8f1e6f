//! Handler functions for account signup and email change.
//!
//! These functions parse incoming request data and delegate to the
//! `UserService` for core business logic.

use crate::api::common::{ApiResponse, service_error_to_http};
use crate::config::Config;
use crate::database::models::{ChangeEmailRequest, CreateNewUser, User};
use crate::services::user_service::UserService;
use crate::utils::jwt::Claims;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;

/// Handle account signup: create the user, then send the confirmation email
#[axum::debug_handler]
pub async fn create_user(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<CreateNewUser>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<User>>), (StatusCode, String)> {
    let user_service = UserService::new(&pool, &config);

    let user = match user_service.create_user(payload).await {
        Ok(user) => user,
        Err(error) => return Err(service_error_to_http(error)),
    };

    match user_service.send_confirmation_email(&user).await {
        Ok(user) => Ok((
            StatusCode::CREATED,
            ResponseJson(ApiResponse::success(
                user,
                "Account created, confirmation email sent",
            )),
        )),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle an email change request for the authenticated user
#[axum::debug_handler]
pub async fn change_email(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ChangeEmailRequest>,
) -> Result<ResponseJson<ApiResponse<User>>, (StatusCode, String)> {
    let user_service = UserService::new(&pool, &config);

    match user_service
        .request_email_change(claims.user_id(), payload)
        .await
    {
        Ok(user) => Ok(ResponseJson(ApiResponse::success(
            user,
            "Confirmation email sent to the new address",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}
