//! Authentication module for managing login sessions and access control.
//!
//! This module provides the public interface for authentication-related
//! functionality: login, logout, session introspection, and the JWT
//! middleware guarding authenticated routes.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
