//! API integration tests.
//!
//! These drive a running server (with a test database) end to end.
//! Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build client")
}

fn unique(prefix: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch");
    format!("{}{}{}", prefix, now.as_secs(), now.subsec_nanos())
}

fn unique_isbn() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch");
    format!("{:06}{:07}", now.as_secs() % 1_000_000, now.subsec_nanos() / 100)
}

/// Register a fresh member and log the client's cookie jar into a session
async fn register_and_login(client: &Client) -> String {
    let email = format!("{}@example.com", unique("member"));

    let response = client
        .post(format!("{}/members/register", BASE_URL))
        .json(&json!({
            "first_name": "Test",
            "last_name": "Member",
            "email": email,
            "password": "reading-room"
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "reading-room",
            "portal": "member"
        }))
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(response.status(), 200);

    email
}

/// Create a book with the given availability using an authenticated client
async fn create_book(client: &Client, availability: i32) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": unique("Title "),
            "author": "Test Author",
            "isbn": unique_isbn(),
            "availability": availability
        }))
        .send()
        .await
        .expect("Failed to send create book request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse book");
    body["id"].as_i64().expect("No book ID")
}

async fn get_availability(client: &Client, book_id: i64) -> i64 {
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send get book request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse book");
    body["availability"].as_i64().expect("No availability")
}

async fn error_kind(response: reqwest::Response) -> String {
    let body: Value = response.json().await.expect("Failed to parse error body");
    body["error"].as_str().expect("No error kind").to_string()
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let response = client()
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
async fn test_protected_routes_require_a_session() {
    let anonymous = client();

    for path in ["/loans", "/reservations", "/members", "/staff", "/auth/me"] {
        let response = anonymous
            .get(format!("{}{}", BASE_URL, path))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 401, "expected 401 for {}", path);
    }
}

#[tokio::test]
#[ignore]
async fn test_wrong_password_and_unknown_email_are_indistinguishable() {
    let c = client();
    let email = register_and_login(&c).await;

    let wrong_password = c
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({"email": email, "password": "wrong", "portal": "member"}))
        .send()
        .await
        .expect("Failed to send request");
    let unknown_email = c
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "nobody-here@example.com",
            "password": "wrong",
            "portal": "member"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(wrong_password.status(), 401);
    assert_eq!(unknown_email.status(), 401);
    assert_eq!(
        error_kind(wrong_password).await,
        error_kind(unknown_email).await
    );
}

#[tokio::test]
#[ignore]
async fn test_login_logout_me_lifecycle() {
    let c = client();
    register_and_login(&c).await;

    let response = c
        .get(format!("{}/auth/me", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["is_staff"], false);

    let response = c
        .post(format!("{}/auth/logout", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    // Logout is idempotent
    let response = c
        .post(format!("{}/auth/logout", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = c
        .get(format!("{}/auth/me", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_move_the_availability_counter() {
    let c = client();
    register_and_login(&c).await;
    let book_id = create_book(&c, 2).await;

    let response = c
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send borrow request");
    assert_eq!(response.status(), 201);

    let loan: Value = response.json().await.expect("Failed to parse loan");
    let loan_id = loan["id"].as_i64().expect("No loan ID");
    assert!(loan["return_date"].is_null());
    assert_eq!(get_availability(&c, book_id).await, 1);

    let response = c
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .send()
        .await
        .expect("Failed to send return request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "returned");
    // Returned on time, no fine
    assert_eq!(body["loan"]["fine"], "0.00");
    assert_eq!(get_availability(&c, book_id).await, 2);
}

#[tokio::test]
#[ignore]
async fn test_double_return_is_rejected() {
    let c = client();
    register_and_login(&c).await;
    let book_id = create_book(&c, 1).await;

    let response = c
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send borrow request");
    let loan: Value = response.json().await.expect("Failed to parse loan");
    let loan_id = loan["id"].as_i64().expect("No loan ID");

    let first = c
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .send()
        .await
        .expect("Failed to send return request");
    assert_eq!(first.status(), 200);

    let second = c
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .send()
        .await
        .expect("Failed to send return request");
    assert_eq!(second.status(), 409);
    assert_eq!(error_kind(second).await, "already_returned");

    // The availability was not incremented twice
    assert_eq!(get_availability(&c, book_id).await, 1);
}

#[tokio::test]
#[ignore]
async fn test_borrowing_an_unavailable_book_fails_cleanly() {
    let c = client();
    register_and_login(&c).await;
    let book_id = create_book(&c, 0).await;

    let response = c
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send borrow request");
    assert_eq!(response.status(), 409);
    assert_eq!(error_kind(response).await, "not_available");
    assert_eq!(get_availability(&c, book_id).await, 0);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrows_of_the_last_copy() {
    let c = client();
    register_and_login(&c).await;
    let book_id = create_book(&c, 1).await;

    let mut handles = Vec::new();
    for _ in 0..5 {
        let c = c.clone();
        handles.push(tokio::spawn(async move {
            c.post(format!("{}/books/{}/borrow", BASE_URL, book_id))
                .send()
                .await
                .expect("Failed to send borrow request")
                .status()
                .as_u16()
        }));
    }

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.expect("borrow task panicked") {
            201 => created += 1,
            409 => conflicts += 1,
            other => panic!("unexpected status {}", other),
        }
    }

    // Exactly one of the racing borrows may win the last copy
    assert_eq!(created, 1);
    assert_eq!(conflicts, 4);
    assert_eq!(get_availability(&c, book_id).await, 0);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_reservation_until_cancelled() {
    let c = client();
    register_and_login(&c).await;
    let book_id = create_book(&c, 1).await;

    let first = c
        .post(format!("{}/books/{}/reserve", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send reserve request");
    assert_eq!(first.status(), 201);
    let reservation: Value = first.json().await.expect("Failed to parse reservation");
    let reservation_id = reservation["id"].as_i64().expect("No reservation ID");
    assert_eq!(reservation["status"], "pending");

    let second = c
        .post(format!("{}/books/{}/reserve", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send reserve request");
    assert_eq!(second.status(), 409);
    assert_eq!(error_kind(second).await, "duplicate_reservation");

    let cancel = c
        .post(format!("{}/reservations/{}/cancel", BASE_URL, reservation_id))
        .send()
        .await
        .expect("Failed to send cancel request");
    assert_eq!(cancel.status(), 200);
    let cancelled: Value = cancel.json().await.expect("Failed to parse reservation");
    assert_eq!(cancelled["status"], "cancelled");

    // With the first reservation resolved, reserving again succeeds
    let third = c
        .post(format!("{}/books/{}/reserve", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send reserve request");
    assert_eq!(third.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_fulfillment_lends_to_the_reserving_member() {
    let c = client();
    register_and_login(&c).await;
    let book_id = create_book(&c, 1).await;

    let response = c
        .post(format!("{}/books/{}/reserve", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send reserve request");
    let reservation: Value = response.json().await.expect("Failed to parse reservation");
    let reservation_id = reservation["id"].as_i64().expect("No reservation ID");
    let member_id = reservation["member_id"].as_i64().expect("No member ID");

    let response = c
        .post(format!("{}/reservations/{}/fulfill", BASE_URL, reservation_id))
        .send()
        .await
        .expect("Failed to send fulfill request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["reservation"]["status"], "confirmed");
    assert_eq!(body["loan"]["member_id"].as_i64(), Some(member_id));
    assert_eq!(get_availability(&c, book_id).await, 0);

    // A resolved reservation cannot be fulfilled or cancelled again
    let again = c
        .post(format!("{}/reservations/{}/fulfill", BASE_URL, reservation_id))
        .send()
        .await
        .expect("Failed to send fulfill request");
    assert_eq!(again.status(), 409);
    assert_eq!(error_kind(again).await, "already_resolved");
}

#[tokio::test]
#[ignore]
async fn test_fulfillment_without_copies_leaves_the_reservation_pending() {
    let c = client();
    register_and_login(&c).await;
    let book_id = create_book(&c, 0).await;

    let response = c
        .post(format!("{}/books/{}/reserve", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send reserve request");
    let reservation: Value = response.json().await.expect("Failed to parse reservation");
    let reservation_id = reservation["id"].as_i64().expect("No reservation ID");

    let response = c
        .post(format!("{}/reservations/{}/fulfill", BASE_URL, reservation_id))
        .send()
        .await
        .expect("Failed to send fulfill request");
    assert_eq!(response.status(), 409);
    assert_eq!(error_kind(response).await, "not_available");

    // The failed fulfillment rolled back; the reservation is still pending
    let response = c
        .get(format!("{}/reservations", BASE_URL))
        .send()
        .await
        .expect("Failed to send list request");
    let reservations: Vec<Value> = response.json().await.expect("Failed to parse list");
    let found = reservations
        .iter()
        .find(|r| r["id"].as_i64() == Some(reservation_id))
        .expect("Reservation missing from listing");
    assert_eq!(found["status"], "pending");
}

#[tokio::test]
#[ignore]
async fn test_member_removal_blocked_by_open_loan() {
    let c = client();
    register_and_login(&c).await;
    let book_id = create_book(&c, 1).await;

    let response = c
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send borrow request");
    let loan: Value = response.json().await.expect("Failed to parse loan");
    let loan_id = loan["id"].as_i64().expect("No loan ID");
    let member_id = loan["member_id"].as_i64().expect("No member ID");

    let response = c
        .delete(format!("{}/members/{}", BASE_URL, member_id))
        .send()
        .await
        .expect("Failed to send remove request");
    assert_eq!(response.status(), 409);
    assert_eq!(error_kind(response).await, "has_open_obligations");

    let response = c
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .send()
        .await
        .expect("Failed to send return request");
    assert_eq!(response.status(), 200);

    // With the loan closed the member may be removed
    let response = c
        .delete(format!("{}/members/{}", BASE_URL, member_id))
        .send()
        .await
        .expect("Failed to send remove request");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_last_administrator_cannot_resign() {
    let c = client();
    register_and_login(&c).await;

    // Ensure at least one administrator exists
    let response = c
        .post(format!("{}/staff", BASE_URL))
        .json(&json!({
            "first_name": "Head",
            "last_name": "Librarian",
            "role": "Administrator",
            "email": format!("{}@example.com", unique("admin")),
            "password": "stacks-of-books"
        }))
        .send()
        .await
        .expect("Failed to send enroll request");
    assert_eq!(response.status(), 201);

    let staffs: Vec<Value> = c
        .get(format!("{}/staff", BASE_URL))
        .send()
        .await
        .expect("Failed to send list request")
        .json()
        .await
        .expect("Failed to parse staff list");

    let admin_ids: Vec<i64> = staffs
        .iter()
        .filter(|s| s["role"] == "Administrator")
        .map(|s| s["id"].as_i64().expect("No staff ID"))
        .collect();

    // Resign administrators one by one; the roster must refuse to lose
    // the last one
    let mut remaining = admin_ids.len();
    for id in admin_ids {
        let response = c
            .delete(format!("{}/staff/{}", BASE_URL, id))
            .send()
            .await
            .expect("Failed to send resign request");

        if remaining > 1 {
            assert_eq!(response.status(), 204);
            remaining -= 1;
        } else {
            assert_eq!(response.status(), 409);
            assert_eq!(error_kind(response).await, "last_administrator");
        }
    }

    // With a second administrator enrolled, either may resign
    let response = c
        .post(format!("{}/staff", BASE_URL))
        .json(&json!({
            "first_name": "Deputy",
            "last_name": "Librarian",
            "role": "Administrator",
            "email": format!("{}@example.com", unique("admin")),
            "password": "stacks-of-books"
        }))
        .send()
        .await
        .expect("Failed to send enroll request");
    assert_eq!(response.status(), 201);
    let second: Value = response.json().await.expect("Failed to parse staff");
    let second_id = second["id"].as_i64().expect("No staff ID");

    let response = c
        .delete(format!("{}/staff/{}", BASE_URL, second_id))
        .send()
        .await
        .expect("Failed to send resign request");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_staff_portal_sessions_cannot_borrow() {
    let member = client();
    register_and_login(&member).await;

    let email = format!("{}@example.com", unique("staff"));
    let response = member
        .post(format!("{}/staff", BASE_URL))
        .json(&json!({
            "first_name": "Desk",
            "last_name": "Clerk",
            "role": "Librarian",
            "email": email,
            "password": "circulation-desk"
        }))
        .send()
        .await
        .expect("Failed to send enroll request");
    assert_eq!(response.status(), 201);

    let staff = client();
    let response = staff
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({"email": email, "password": "circulation-desk", "portal": "staff"}))
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["session"]["is_staff"], true);
    assert_eq!(body["session"]["is_admin"], false);

    // Staff sessions carry no member identity to lend to
    let book_id = create_book(&member, 1).await;
    let response = staff
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send borrow request");
    assert_eq!(response.status(), 401);

    // But staff see every loan and may return on a member's behalf
    let response = member
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send borrow request");
    assert_eq!(response.status(), 201);
    let loan: Value = response.json().await.expect("Failed to parse loan");
    let loan_id = loan["id"].as_i64().expect("No loan ID");

    let response = staff
        .get(format!("{}/loans", BASE_URL))
        .send()
        .await
        .expect("Failed to send list request");
    let loans: Vec<Value> = response.json().await.expect("Failed to parse loans");
    assert!(loans.iter().any(|l| l["id"].as_i64() == Some(loan_id)));

    let response = staff
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .send()
        .await
        .expect("Failed to send return request");
    assert_eq!(response.status(), 200);
}

#[tokio::test]
#[ignore]
async fn test_invalid_and_duplicate_isbns_are_rejected() {
    let c = client();
    register_and_login(&c).await;

    let response = c
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "Bad ISBN",
            "author": "Nobody",
            "isbn": "978-3-16-148410-0",
            "availability": 1
        }))
        .send()
        .await
        .expect("Failed to send create request");
    assert_eq!(response.status(), 400);
    assert_eq!(error_kind(response).await, "invalid_isbn");

    let isbn = unique_isbn();
    let response = c
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "First Copy",
            "author": "Nobody",
            "isbn": isbn,
            "availability": 1
        }))
        .send()
        .await
        .expect("Failed to send create request");
    assert_eq!(response.status(), 201);

    let response = c
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "Second Copy",
            "author": "Nobody",
            "isbn": isbn,
            "availability": 1
        }))
        .send()
        .await
        .expect("Failed to send create request");
    assert_eq!(response.status(), 409);
    assert_eq!(error_kind(response).await, "duplicate_isbn");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_member_email_is_rejected() {
    let c = client();
    let email = register_and_login(&c).await;

    let response = c
        .post(format!("{}/members/register", BASE_URL))
        .json(&json!({
            "first_name": "Other",
            "last_name": "Person",
            "email": email,
            "password": "reading-room"
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), 409);
    assert_eq!(error_kind(response).await, "duplicate_email");
}
