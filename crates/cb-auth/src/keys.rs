//! RSA key material helpers.
//!
//! Production deployments configure the identity provider's published
//! public key; dev mode and tests generate an ephemeral pair instead.

use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::AuthError;

const KEY_BITS: usize = 2048;

/// Generate an ephemeral RSA keypair as (private PKCS#8 PEM, public SPKI PEM).
pub fn generate_rsa_keypair() -> Result<(String, String), AuthError> {
    let mut rng = rand::thread_rng();
    let private = RsaPrivateKey::new(&mut rng, KEY_BITS)
        .map_err(|e| AuthError::InvalidKey(e.to_string()))?;
    let public = RsaPublicKey::from(&private);

    let private_pem = private
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| AuthError::InvalidKey(e.to_string()))?
        .to_string();
    let public_pem = public
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| AuthError::InvalidKey(e.to_string()))?;

    Ok((private_pem, public_pem))
}

/// Short fingerprint of a PEM, safe to log.
pub fn fingerprint(pem: &str) -> String {
    let digest = Sha256::digest(pem.as_bytes());
    hex::encode(&digest[..8])
}
