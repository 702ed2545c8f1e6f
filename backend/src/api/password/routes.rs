//! Defines the HTTP routes for the password reset flow.

use super::handlers::{forgot_password, reset_password};
use axum::{
    Router,
    routing::{post, put},
};

pub async fn password_router() -> Router {
    Router::new()
        .route("/", post(forgot_password))
        .route("/", put(reset_password))
}
