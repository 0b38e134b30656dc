//! Access and refresh token issuance
//!
//! Access tokens are HS256 JWTs with a short lifetime. Refresh tokens are
//! opaque random strings; only their SHA-256 digest is ever persisted.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;

/// JWT-related errors
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Signing key is not configured")]
    MissingSigningKey,

    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// JWT claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

impl Claims {
    /// Parse the subject back into a user id
    pub fn user_id(&self) -> Result<i64, TokenError> {
        self.sub
            .parse::<i64>()
            .map_err(|e| TokenError::InvalidToken(format!("bad subject: {}", e)))
    }
}

/// Signs and verifies access tokens with the process-wide signing key
#[derive(Clone)]
pub struct TokenIssuer {
    signing_key: Option<String>,
    issuer: String,
    audience: String,
    access_token_ttl_seconds: i64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("signing_key", &self.signing_key.as_ref().map(|_| "****"))
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .finish()
    }
}

impl TokenIssuer {
    /// Create an issuer. An empty key counts as absent.
    pub fn new(
        signing_key: Option<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        access_token_ttl_seconds: i64,
    ) -> Self {
        Self {
            signing_key: signing_key.filter(|k| !k.is_empty()),
            issuer: issuer.into(),
            audience: audience.into(),
            access_token_ttl_seconds,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.jwt_secret.clone(),
            config.jwt_issuer.clone(),
            config.jwt_audience.clone(),
            config.jwt_access_token_ttl_seconds,
        )
    }

    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.access_token_ttl_seconds
    }

    pub fn has_signing_key(&self) -> bool {
        self.signing_key.is_some()
    }

    fn key(&self) -> Result<&[u8], TokenError> {
        self.signing_key
            .as_deref()
            .map(str::as_bytes)
            .ok_or(TokenError::MissingSigningKey)
    }

    /// Issue an access token for a user
    pub fn issue_access_token(&self, user_id: i64) -> Result<String, TokenError> {
        self.issue_access_token_with_ttl(user_id, self.access_token_ttl_seconds)
    }

    fn issue_access_token_with_ttl(
        &self,
        user_id: i64,
        ttl_seconds: i64,
    ) -> Result<String, TokenError> {
        let key = self.key()?;
        let now = Utc::now();
        let exp = now + Duration::seconds(ttl_seconds);

        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(key),
        )
        .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Verify signature, expiry, issuer and audience of an access token
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        let key = self.key()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<Claims>(token, &DecodingKey::from_secret(key), &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::TokenExpired,
                _ => TokenError::InvalidToken(e.to_string()),
            })?;

        Ok(token_data.claims)
    }
}

/// Generate an opaque refresh token: 32 bytes from the OS-seeded CSPRNG, hex encoded
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Digest under which a refresh token is stored and looked up
pub fn hash_refresh_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(Some(secret.to_string()), "test-issuer", "test-audience", 900)
    }

    #[test]
    fn test_issue_access_token() {
        let issuer = issuer("test-secret-key");

        let token = issuer.issue_access_token(42).unwrap();
        assert!(!token.is_empty());

        let claims = issuer.verify_access_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-audience");
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_missing_signing_key() {
        let issuer = TokenIssuer::new(None, "test-issuer", "test-audience", 900);
        assert!(!issuer.has_signing_key());
        assert!(matches!(
            issuer.issue_access_token(1),
            Err(TokenError::MissingSigningKey)
        ));

        let empty = TokenIssuer::new(Some(String::new()), "test-issuer", "test-audience", 900);
        assert!(matches!(
            empty.issue_access_token(1),
            Err(TokenError::MissingSigningKey)
        ));
    }

    #[test]
    fn test_invalid_token() {
        let result = issuer("test-secret-key").verify_access_token("invalid.token.here");
        assert!(matches!(result, Err(TokenError::InvalidToken(_))));
    }

    #[test]
    fn test_wrong_secret() {
        let token = issuer("secret1").issue_access_token(1).unwrap();
        assert!(issuer("secret2").verify_access_token(&token).is_err());
    }

    #[test]
    fn test_wrong_audience() {
        let token = issuer("secret").issue_access_token(1).unwrap();
        let other = TokenIssuer::new(Some("secret".to_string()), "test-issuer", "elsewhere", 900);
        assert!(matches!(
            other.verify_access_token(&token),
            Err(TokenError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        let issuer = issuer("secret");
        let token = issuer.issue_access_token_with_ttl(1, -3600).unwrap();
        assert!(matches!(
            issuer.verify_access_token(&token),
            Err(TokenError::TokenExpired)
        ));
    }

    #[test]
    fn test_refresh_tokens_are_unique() {
        let first = generate_refresh_token();
        let second = generate_refresh_token();
        assert_eq!(first.len(), 64);
        assert_ne!(first, second);
    }

    #[test]
    fn test_hash_refresh_token_is_stable_digest() {
        let token = generate_refresh_token();
        let digest = hash_refresh_token(&token);
        assert_eq!(digest, hash_refresh_token(&token));
        assert_ne!(digest, token);
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn test_debug_hides_signing_key() {
        let rendered = format!("{:?}", issuer("super-secret"));
        assert!(!rendered.contains("super-secret"));
    }
}
