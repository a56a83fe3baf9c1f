//! Tamarind Core - Shared types library.
//!
//! This crate provides common types used across all Tamarind components:
//! - `api` - Public storefront JSON API
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure computation - no I/O, no
//! database access, no HTTP. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, roles, and money
//! - [`token`] - Signed, expiring credential tokens (stateless sessions)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod token;
pub mod types;

pub use token::{CredentialCodec, CredentialError};
pub use types::*;
