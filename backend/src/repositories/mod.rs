//! Database repositories.

pub mod user_repository;
