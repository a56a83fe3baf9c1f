//! Integration tests for registration, login, and credential gating.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p tamarind-api)
//! - Seeded data (cargo run -p tamarind-cli -- seed)
//!
//! Run with: cargo test -p tamarind-integration-tests -- --ignored

use serde_json::json;

use tamarind_integration_tests::{admin_client, base_url, client, register_customer, unique_email};

#[tokio::test]
#[ignore = "Requires a running API server and database"]
async fn test_register_sets_cookie_and_returns_profile() {
    let client = client();
    let email = unique_email("register");

    let profile = register_customer(&client, &email, "hunter2hunter2").await;

    assert_eq!(profile["email"], email);
    assert_eq!(profile["role"], "customer");
    assert!(profile.get("password").is_none());
    assert!(profile.get("passwordHash").is_none());

    // The cookie from registration authenticates the profile read
    let resp = client
        .get(format!("{}/api/users/profile", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
#[ignore = "Requires a running API server and database"]
async fn test_duplicate_registration_conflicts() {
    let client = client();
    let email = unique_email("dup");

    register_customer(&client, &email, "hunter2hunter2").await;

    let resp = client
        .post(format!("{}/api/users", base_url()))
        .json(&json!({
            "name": "Second",
            "email": email,
            "password": "hunter2hunter2",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
#[ignore = "Requires a running API server and database"]
async fn test_login_with_wrong_password_is_rejected() {
    let client = client();
    let email = unique_email("wrongpw");
    register_customer(&client, &email, "hunter2hunter2").await;

    let resp = client
        .post(format!("{}/api/users/login", base_url()))
        .json(&json!({ "email": email, "password": "not-the-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
#[ignore = "Requires a running API server and database"]
async fn test_protected_route_without_cookie_is_401() {
    // No cookie store interaction at all
    let resp = reqwest::get(format!("{}/api/users/profile", base_url()))
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
#[ignore = "Requires a running API server and database"]
async fn test_logout_clears_the_cookie() {
    let client = client();
    let email = unique_email("logout");
    register_customer(&client, &email, "hunter2hunter2").await;

    let resp = client
        .post(format!("{}/api/users/logout", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .get(format!("{}/api/users/profile", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
#[ignore = "Requires a running API server and database"]
async fn test_customer_cannot_reach_admin_routes() {
    let client = client();
    let email = unique_email("notadmin");
    register_customer(&client, &email, "hunter2hunter2").await;

    let resp = client
        .get(format!("{}/api/users", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
#[ignore = "Requires a running API server and database"]
async fn test_admin_can_list_users() {
    let admin = admin_client().await;

    let resp = admin
        .get(format!("{}/api/users", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let users: serde_json::Value = resp.json().await.unwrap();
    assert!(users.as_array().is_some_and(|a| !a.is_empty()));
}

#[tokio::test]
#[ignore = "Requires a running API server and database"]
async fn test_profile_update_changes_name() {
    let client = client();
    let email = unique_email("rename");
    register_customer(&client, &email, "hunter2hunter2").await;

    let resp = client
        .put(format!("{}/api/users/profile", base_url()))
        .json(&json!({ "name": "Renamed Customer", "email": email }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let profile: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(profile["name"], "Renamed Customer");
}
