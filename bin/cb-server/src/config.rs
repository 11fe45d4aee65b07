//! Server configuration from environment variables.
//!
//! Required secrets are validated here, at startup - a missing webhook
//! secret or verification key fails the boot, never the first request.

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Dev mode swaps in in-memory backends and ephemeral secrets
    pub dev_mode: bool,
    pub database_url: Option<String>,
    pub idp_issuer: String,
    /// Identity provider's public verification key (PEM)
    pub idp_public_key_pem: Option<String>,
    pub webhook_secret: Option<String>,
    pub publish_queue: String,
    pub notification_queue: String,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Inline env material wins over a path; the path is read eagerly so bad
/// config surfaces at boot.
fn key_material(inline_key: &str, path_key: &str) -> Result<Option<String>> {
    if let Ok(pem) = std::env::var(inline_key) {
        return Ok(Some(pem));
    }
    match std::env::var(path_key) {
        Ok(path) => {
            let pem = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {} from {}", inline_key, path))?;
            Ok(Some(pem))
        }
        Err(_) => Ok(None),
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let dev_mode = std::env::var("CB_DEV_MODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let idp_public_key_pem = key_material("CB_IDP_PUBLIC_KEY", "CB_IDP_PUBLIC_KEY_PATH")?;
        let webhook_secret = std::env::var("CB_WEBHOOK_SECRET").ok();
        let database_url = std::env::var("CB_DATABASE_URL").ok();

        if !dev_mode {
            if idp_public_key_pem.is_none() {
                bail!("CB_IDP_PUBLIC_KEY or CB_IDP_PUBLIC_KEY_PATH is required");
            }
            if webhook_secret.is_none() {
                bail!("CB_WEBHOOK_SECRET is required");
            }
            if database_url.is_none() {
                bail!("CB_DATABASE_URL is required");
            }
        }

        Ok(Self {
            port: env_or_parse("CB_API_PORT", 8080),
            dev_mode,
            database_url,
            idp_issuer: env_or("CB_IDP_ISSUER", "https://idp.example.com"),
            idp_public_key_pem,
            webhook_secret,
            publish_queue: env_or("CB_PUBLISH_QUEUE", "publish-jobs"),
            notification_queue: env_or("CB_NOTIFICATION_QUEUE", "notification-jobs"),
        })
    }
}
