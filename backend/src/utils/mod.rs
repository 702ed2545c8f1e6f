//! Utility modules shared across the backend.

pub mod jwt;
pub mod password;
pub mod token;
