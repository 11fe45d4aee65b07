//! Castbridge Platform
//!
//! Core of the multi-tenant workspace/project platform:
//! - Bearer-token auth gate in front of every business route
//! - Idempotent ingestion of signed identity-provider webhooks
//! - Publishing pipeline dispatch onto a durable job queue
//! - Workspace invitation flow with queued notification delivery

pub mod api;
pub mod domain;
pub mod error;
pub mod repository;
pub mod service;

pub use error::PlatformError;
