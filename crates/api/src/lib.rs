//! Tamarind storefront API library.
//!
//! This crate provides the API server as a library, allowing it to be
//! tested and reused (the CLI borrows its repositories and password
//! hashing for seeding).
//!
//! # Architecture
//!
//! - Axum JSON handlers over a `PostgreSQL` store
//! - Signed, expiring credential tokens in an HTTP-only cookie
//! - Repositories own the SQL; services own the domain rules; state
//!   transitions that must be correct are pure methods on the models

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
