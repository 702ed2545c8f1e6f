//! Opaque secure-token generation.
//!
//! Confirmation and password-reset tokens are random alphanumeric strings.
//! The generator sits behind a trait so tests can substitute a deterministic
//! implementation.

use rand::{Rng, distributions::Alphanumeric};

/// Length of generated account tokens.
pub const TOKEN_LENGTH: usize = 24;

/// Produces opaque, URL-safe random tokens.
pub trait TokenGenerator: Send + Sync {
    /// Returns a fresh token; successive calls yield distinct values
    /// (collision-negligible).
    fn generate(&self) -> String;
}

/// Default generator backed by the thread-local CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct SecureTokenGenerator;

impl TokenGenerator for SecureTokenGenerator {
    fn generate(&self) -> String {
        generate_random_string(TOKEN_LENGTH)
    }
}

/// Generates a random alphanumeric string of the specified length.
///
/// The generated string contains uppercase letters (A-Z), lowercase letters
/// (a-z), and digits (0-9), and is suitable for tokens and other opaque
/// identifiers.
pub fn generate_random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
