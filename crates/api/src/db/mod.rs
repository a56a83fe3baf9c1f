//! Database access for the storefront API.
//!
//! # Layout
//!
//! One repository per aggregate:
//!
//! - [`users::UserRepository`] - accounts and password hashes
//! - [`products::ProductRepository`] - catalog items and reviews
//! - [`orders::OrderRepository`] - orders and their line items
//!
//! Queries are runtime-checked (`sqlx::query_as` with `FromRow` row types)
//! so the workspace compiles without a live database. Multi-statement
//! mutations that must be atomic (payment capture, delivery marking, review
//! append) run inside a transaction with the target row locked
//! `FOR UPDATE`; the repositories expose connection-scoped helpers for the
//! services layer to compose.
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p tamarind-cli -- migrate
//! ```

pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The referenced row does not exist.
    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored value failed to parse back into its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Map a sqlx error to [`RepositoryError::Conflict`] when it is a unique
/// violation, passing everything else through as a database error.
fn conflict_on_unique(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

/// Map a sqlx error to [`RepositoryError::Conflict`] when it is a foreign
/// key violation, passing everything else through as a database error.
fn conflict_on_reference(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}
