//! Blocking HTTP transport for `warehouse-core`.
//!
//! # Overview
//! The core only builds and parses plain-data requests. This crate performs
//! the round-trip with `ureq` and adds the `Authorization` header derived
//! from [`Credentials`].
//!
//! # Design
//! - `Config` comes from the environment or is built directly.
//! - `TokenTransport` never treats a status as an error; the core's
//!   dispatcher decides what each status means.

pub mod config;
pub mod transport;

pub use config::{Config, ConfigError, Credentials};
pub use transport::TokenTransport;

use warehouse_core::Warehouse;

/// A warehouse client for `config.host` using its credentials.
pub fn connect(config: &Config) -> Warehouse<TokenTransport> {
    tracing::debug!(host = %config.host, authenticated = config.credentials.is_some(), "connecting");
    Warehouse::new(&config.host, TokenTransport::new(config.credentials.as_ref()))
}
