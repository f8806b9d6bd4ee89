//! Tenant mailer domain primitives.
//!
//! This crate owns request validation, the template catalog, object-store key
//! layout and placeholder rendering. It intentionally excludes AWS SDK and
//! Lambda runtime concerns so every rule here can be exercised without I/O.

pub mod catalog;
pub mod contract;
pub mod render;
pub mod storage_keys;
