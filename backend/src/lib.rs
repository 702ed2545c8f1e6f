//! User account backend library.
//!
//! Exposes the account record, its lifecycle services, and the HTTP surface
//! so the binary and the integration tests share one crate.

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod utils;

use axum::{Extension, Router, response::Json, routing::get};

use crate::api::common::ApiResponse;
use crate::config::Config;
use sqlx::SqlitePool;

/// Builds the application router with all routes and shared state attached.
pub async fn app(pool: SqlitePool, config: Config) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .nest("/auth", auth::routes::auth_router())
        .nest("/api/user", api::user::routes::user_router().await)
        .nest(
            "/api/confirmation",
            api::confirmation::routes::confirmation_router().await,
        )
        .nest("/api/password", api::password::routes::password_router().await)
        .layer(Extension(pool))
        .layer(Extension(config))
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "Accounts Backend",
            "version": "0.1.0"
        }),
        "Welcome to the Accounts API",
    ))
}
