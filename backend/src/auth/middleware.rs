//! Middleware for protecting authenticated routes.
//!
//! This module contains logic for validating session tokens and attaching
//! the decoded claims to the request for downstream handlers.

use crate::config::Config;
use crate::utils::jwt::{Claims, JwtUtils};
use axum::{
    extract::{Extension, Request},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
}

/// JWT authentication middleware; rejects requests without a valid token
pub async fn jwt_auth(
    Extension(config): Extension<Config>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = bearer_token(&request).ok_or(StatusCode::UNAUTHORIZED)?;

    let jwt_utils = JwtUtils::new(&config);

    match jwt_utils.validate_token(token) {
        Ok(claims) => {
            // Add claims to request extensions for use in handlers
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(_) => Err(StatusCode::UNAUTHORIZED),
    }
}

/// Optional JWT authentication middleware (doesn't fail if no token).
///
/// Always inserts an `Option<Claims>` extension so handlers can distinguish
/// an authenticated caller from an anonymous one.
pub async fn optional_jwt_auth(
    Extension(config): Extension<Config>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims: Option<Claims> = bearer_token(&request)
        .and_then(|token| JwtUtils::new(&config).validate_token(token).ok());

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
