//! Bearer token verification.
//!
//! Tokens are issued by the external identity provider and verified locally
//! against its published RSA public key: signature, expiry, and issuer.

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Verified identity of a request's caller.
///
/// Resolved per request by the auth gate, attached for the lifetime of that
/// request, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Claims expected in identity-provider access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject - the provider's user id
    pub sub: String,
    pub iss: String,
    /// Expiry, seconds since epoch
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Capability of turning a caller-supplied credential into a [`Principal`].
///
/// The auth gate depends on this, not on a concrete provider, so providers
/// are swappable (and tests can plug in whatever they need).
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Principal, AuthError>;
}

/// Validates externally-issued bearer tokens.
///
/// Construct once at startup from the provider's public verification
/// material; `verify` is pure and safe to call concurrently.
pub struct BearerVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl BearerVerifier {
    pub fn new(public_key_pem: &str, issuer: &str) -> Result<Self, AuthError> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| AuthError::InvalidKey(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Verify a bearer token and resolve the caller's [`Principal`].
    pub fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                ErrorKind::InvalidIssuer => AuthError::UnverifiedIssuer,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        let claims = data.claims;
        Ok(Principal {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
        })
    }
}

impl CredentialVerifier for BearerVerifier {
    fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        BearerVerifier::verify(self, token)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
