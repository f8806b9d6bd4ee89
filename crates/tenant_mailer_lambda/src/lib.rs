//! AWS-oriented adapters and handlers for the tenant mailer.
//!
//! This crate owns runtime integration details (Lambda event handling, the
//! object-store and email capability seams, configuration and logging) and
//! re-exports the domain crate through a single `runtime` module boundary.

pub mod adapters;
pub mod config;
pub mod error;
pub mod handlers;
pub mod observability;
pub mod runtime;
