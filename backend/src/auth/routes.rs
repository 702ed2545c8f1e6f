//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle login, logout, and session introspection, and are
//! designed to be integrated into the main Axum router.

use crate::auth::handlers::*;
use crate::auth::middleware::*;
use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route(
            "/logout",
            delete(logout).layer(middleware::from_fn(optional_jwt_auth)),
        )
        .route("/me", get(me).layer(middleware::from_fn(jwt_auth)))
}
