//! Defines the HTTP routes for the email confirmation flow.

use super::handlers::{confirm, resend_confirmation};
use axum::{
    Router,
    routing::{get, post},
};

pub async fn confirmation_router() -> Router {
    Router::new()
        .route("/", post(resend_confirmation))
        .route("/{token}", get(confirm))
}
