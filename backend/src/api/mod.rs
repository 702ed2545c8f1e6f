//! HTTP API surface.

pub mod common;
pub mod confirmation;
pub mod password;
pub mod user;
