//! API integration tests
//!
//! These run against a live server. Start one locally, then run:
//! cargo test -- --ignored
//!
//! Authenticated tests read an admin access token from
//! LIBRIS_TEST_ACCESS_TOKEN (obtain one via POST /auth/google with a real
//! Google ID token). Login-flow tests additionally need a Google ID token
//! for a separate, non-admin account in LIBRIS_TEST_GOOGLE_TOKEN.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn access_token() -> String {
    std::env::var("LIBRIS_TEST_ACCESS_TOKEN")
        .expect("Set LIBRIS_TEST_ACCESS_TOKEN to run authenticated tests")
}

/// Google ID token for a non-admin test account, used by the login-flow
/// tests that need to mint fresh refresh tokens
fn google_token() -> String {
    std::env::var("LIBRIS_TEST_GOOGLE_TOKEN")
        .expect("Set LIBRIS_TEST_GOOGLE_TOKEN to run login-flow tests")
}

async fn login(client: &Client) -> Value {
    let response = client
        .post(format!("{}/auth/google", BASE_URL))
        .json(&json!({ "token": google_token() }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    response.json().await.expect("Failed to parse login response")
}

async fn refresh_status(client: &Client, refresh_token: &str) -> u16 {
    client
        .post(format!("{}/auth/refresh", BASE_URL))
        .json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .expect("Failed to send request")
        .status()
        .as_u16()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_google_login_requires_token() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/google", BASE_URL))
        .json(&json!({ "token": "" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_google_login_rejects_garbage_token() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/google", BASE_URL))
        .json(&json!({ "token": "not-a-google-token" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_refresh_requires_token() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/refresh", BASE_URL))
        .json(&json!({ "refresh_token": "" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_refresh_rejects_unknown_token() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/refresh", BASE_URL))
        .json(&json!({ "refresh_token": "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_me_requires_authentication() {
    let client = Client::new();

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_malformed_bearer_header_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", "Token abc123")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let token = access_token();

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["user"]["email"].is_string());
    assert!(body["permissions"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_list_roles_and_permissions() {
    let client = Client::new();
    let token = access_token();

    let response = client
        .get(format!("{}/auth/roles", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["roles"].as_array().expect("roles array").len(), 3);

    let response = client
        .get(format!("{}/auth/permissions", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["permissions"].as_array().expect("permissions array").len(), 9);
}

#[tokio::test]
#[ignore]
async fn test_list_books() {
    let client = Client::new();
    let token = access_token();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert!(body["total"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_create_checkout_checkin_delete_book() {
    let client = Client::new();
    let token = access_token();

    // Create book (requires CREATE_BOOK)
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Integration Test Book",
            "author": "Test Author"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let book_id = body["id"].as_i64().expect("No book ID");

    // Checkout
    let response = client
        .post(format!("{}/books/{}/checkout", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "borrower_name": "A Patron",
            "borrower_email": "patron@example.com"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["is_checked_out"], true);

    // Double checkout is refused
    let response = client
        .post(format!("{}/books/{}/checkout", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "borrower_name": "Another Patron",
            "borrower_email": "other@example.com"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    // Deleting a checked-out book is refused
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    // Checkin
    let response = client
        .post(format!("{}/books/{}/checkin", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["is_checked_out"], false);

    // Delete
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_logout_all_invalidates_refresh_token() {
    let client = Client::new();
    let token = access_token();
    let refresh_token = std::env::var("LIBRIS_TEST_REFRESH_TOKEN")
        .expect("Set LIBRIS_TEST_REFRESH_TOKEN to run this test");

    let response = client
        .post(format!("{}/auth/logout-all", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    // The refresh token issued at login must now be rejected
    let response = client
        .post(format!("{}/auth/refresh", BASE_URL))
        .json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_second_login_invalidates_previous_refresh_token() {
    let client = Client::new();

    let first = login(&client).await;
    let first_refresh = first["refresh_token"].as_str().expect("No refresh token");

    let second = login(&client).await;
    let second_refresh = second["refresh_token"].as_str().expect("No refresh token");

    // At most one refresh token per user is valid: the earlier one is dead,
    // the latest one still works
    assert_eq!(refresh_status(&client, first_refresh).await, 401);
    assert_eq!(refresh_status(&client, second_refresh).await, 200);
}

#[tokio::test]
#[ignore]
async fn test_deactivated_user_cannot_refresh() {
    let client = Client::new();
    let admin_token = access_token();

    let session = login(&client).await;
    let user_id = session["user"]["id"].as_i64().expect("No user id");
    let refresh_token = session["refresh_token"].as_str().expect("No refresh token");

    // Deactivate the freshly logged-in user
    let response = client
        .put(format!("{}/auth/users/{}/status", BASE_URL, user_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({ "is_active": false }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    // Their refresh token was revoked as part of deactivation
    assert_eq!(refresh_status(&client, refresh_token).await, 401);

    // Restore the account for subsequent runs
    let response = client
        .put(format!("{}/auth/users/{}/status", BASE_URL, user_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({ "is_active": true }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_out_of_range_pagination_is_clamped() {
    let client = Client::new();
    let token = access_token();

    let response = client
        .get(format!("{}/books?page=0&per_page=-5", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 1);
}

#[tokio::test]
#[ignore]
async fn test_missing_book_answers_404() {
    let client = Client::new();
    let token = access_token();
    let missing = format!("{}/books/999999999", BASE_URL);

    let get = client
        .get(&missing)
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(get.status(), 404);

    let checkout = client
        .post(format!("{}/checkout", missing))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "borrower_name": "Nobody",
            "borrower_email": "nobody@example.com"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(checkout.status(), 404);

    let checkin = client
        .post(format!("{}/checkin", missing))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(checkin.status(), 404);
}
