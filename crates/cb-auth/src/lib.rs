//! Castbridge Trust Verifier
//!
//! Pure verification primitives for the two external trust boundaries:
//! - Bearer tokens issued by the identity provider (RS256 JWT)
//! - Webhook payload signatures (HMAC-SHA256 over the raw request body)
//!
//! Both operate on already-loaded key material and perform no I/O, so they
//! are safe to share read-only across request handlers.

use thiserror::Error;

pub mod keys;
pub mod signature;
pub mod token;

pub use token::{
    extract_bearer_token, AccessTokenClaims, BearerVerifier, CredentialVerifier, Principal,
};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing credential")]
    MissingCredential,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Unverified issuer")]
    UnverifiedIssuer,

    #[error("Invalid key material: {0}")]
    InvalidKey(String),
}

impl AuthError {
    /// Stable machine-readable code for the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "MISSING_CREDENTIAL",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::ExpiredToken => "TOKEN_EXPIRED",
            AuthError::UnverifiedIssuer => "UNVERIFIED_ISSUER",
            AuthError::InvalidKey(_) => "INVALID_KEY",
        }
    }
}
