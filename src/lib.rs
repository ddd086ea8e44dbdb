//! # OIDC Token Cache
//!
//! Credential cache engine for an OAuth2/OIDC client: persists and serves
//! access, refresh and id tokens plus account records under a composite
//! identity key, applies token validity policy, and bridges to a legacy
//! cache format during migration.
//!
//! Modules:
//! - `cache`: data model, validity policy and the Cache Manager
//! - `storage`: storage worker trait, Storage Manager, bundled workers
//! - `adapter`: structured and legacy token cache adapters
//! - `request`: per-request key material
//! - `config`: YAML configuration

pub mod adapter;
pub mod cache;
pub mod config;
pub mod helpers;
pub mod request;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::config::types::ServiceConfig;
