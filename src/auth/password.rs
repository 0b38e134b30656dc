//! Password hashing
//!
//! bcrypt hashes are self-describing: algorithm version, cost and salt are all
//! encoded in the output string, so verification needs nothing but the hash.

use thiserror::Error;

/// bcrypt reads at most this many bytes of input and ignores the rest
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password cannot be longer than 72 bytes")]
    TooLong,

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}

/// Salted adaptive password hasher
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// Passwords longer than `MAX_PASSWORD_BYTES` are refused rather than
    /// truncated.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordError::TooLong);
        }
        bcrypt::hash(plaintext, self.cost).map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// Malformed hashes and over-long passwords verify as `false`.
    pub fn verify(&self, plaintext: &str, hashed: &str) -> bool {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        bcrypt::verify(plaintext, hashed).unwrap_or(false)
    }
}
