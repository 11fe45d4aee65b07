//! Webhook signature verification.
//!
//! Identity-provider webhooks carry an HMAC-SHA256 signature of the exact
//! raw request body, hex encoded under a `sha256=` prefix. Verification
//! fails closed: malformed headers, invalid hex, and mismatches all read as
//! untrusted.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Sign a payload, returning the full header value `sha256=<hex>`.
pub fn sign(secret: &[u8], payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key size");
    mac.update(payload);
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes()))
}

/// Verify a `sha256=<hex>` signature header against the raw body bytes.
///
/// The comparison runs in constant time via `Mac::verify_slice`.
pub fn verify(secret: &[u8], signature_header: &str, payload: &[u8]) -> bool {
    let Some(expected_hex) = signature_header.strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };

    let expected = match hex::decode(expected_hex) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}
