//! Integration tests for Tamarind.
//!
//! # Running Tests
//!
//! ```bash
//! # Run migrations and start the API server
//! cargo run -p tamarind-cli -- migrate
//! cargo run -p tamarind-cli -- seed
//! cargo run -p tamarind-api
//!
//! # Run integration tests (ignored by default)
//! cargo test -p tamarind-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `TAMARIND_BASE_URL` - API base URL (default: `http://localhost:5000`)
//!
//! The seeded admin account (`admin@tamarind.shop`) is used for admin-only
//! endpoints; customer accounts are registered fresh per test run so tests
//! do not collide.

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("TAMARIND_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// Create an HTTP client with a cookie store, so the credential cookie
/// set by register/login rides along on subsequent requests.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique email per call, so repeated test runs never conflict.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@tamarind.test", Uuid::new_v4().simple())
}

/// Register a fresh customer account and return its profile JSON.
///
/// The client's cookie store now holds the credential cookie.
///
/// # Panics
///
/// Panics if the request fails or does not return 201.
pub async fn register_customer(client: &Client, email: &str, password: &str) -> Value {
    let resp = client
        .post(format!("{}/api/users", base_url()))
        .json(&json!({
            "name": "Test Customer",
            "email": email,
            "password": password,
        }))
        .send()
        .await
        .expect("register request failed");

    assert_eq!(resp.status(), 201, "registration should return 201");
    resp.json().await.expect("register response not JSON")
}

/// Log in as the seeded admin and return an authenticated client.
///
/// # Panics
///
/// Panics if the seeded admin account is missing or login fails.
pub async fn admin_client() -> Client {
    let client = client();
    let resp = client
        .post(format!("{}/api/users/login", base_url()))
        .json(&json!({
            "email": "admin@tamarind.shop",
            "password": "tamarind-admin-1",
        }))
        .send()
        .await
        .expect("admin login request failed");

    assert_eq!(resp.status(), 200, "seeded admin login should succeed");
    client
}
