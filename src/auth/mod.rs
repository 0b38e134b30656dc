//! Authentication module
//!
//! - Password hashing with bcrypt
//! - JWT access token generation and validation
//! - Opaque refresh tokens with rotation

mod jwt;
mod password;
mod service;

pub use jwt::{generate_refresh_token, hash_refresh_token, Claims, TokenError, TokenIssuer};
pub use password::{PasswordError, PasswordHasher, MAX_PASSWORD_BYTES};
pub use service::{AuthError, AuthService, TokenPair};
