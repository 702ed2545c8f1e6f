//! Defines the HTTP routes for account signup and email change.

use super::handlers::{change_email, create_user};
use crate::auth::middleware::jwt_auth;
use axum::{
    Router, middleware,
    routing::{post, put},
};

pub async fn user_router() -> Router {
    Router::new()
        .route("/", post(create_user))
        .route(
            "/email",
            put(change_email).layer(middleware::from_fn(jwt_auth)),
        )
}
