//! Password hashing and verification.
//!
//! Wraps bcrypt behind a trait so the service layer never touches the
//! primitive directly and tests can swap in a cheap fake.

use crate::errors::{ServiceError, ServiceResult};
use bcrypt::{DEFAULT_COST, hash, verify};

/// Hashes plaintext passwords and verifies candidates against stored hashes.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> ServiceResult<String>;
    fn verify(&self, password: &str, hash: &str) -> ServiceResult<bool>;
}

/// Default hasher using bcrypt at `DEFAULT_COST`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BcryptPasswordHasher;

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, password: &str) -> ServiceResult<String> {
        hash(password, DEFAULT_COST)
            .map_err(|e| ServiceError::internal_error(format!("Password hashing failed: {}", e)))
    }

    fn verify(&self, password: &str, stored_hash: &str) -> ServiceResult<bool> {
        verify(password, stored_hash).map_err(|e| {
            ServiceError::internal_error(format!("Password verification failed: {}", e))
        })
    }
}
