use readlog::domain::repositories::UserRepository;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use crate::helpers::{
    TEST_PASSWORD, browser, create_user, last_verification_code, login, post_form,
    register_via_forms, spawn_app,
};

#[tokio::test]
async fn login_returns_a_token_and_sets_the_session_cookie() {
    let app = spawn_app().await;
    create_user(&app, "reader").await;

    let response = Client::new()
        .post(app.api_url("/auth/login"))
        .json(&json!({ "username": "reader", "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .expect("login should set a cookie")
        .to_string();
    assert!(cookie.starts_with("readlog_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));

    let body: Value = response.json().await.expect("Failed to parse body");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["username"], "reader");
    assert!(
        body["user"].get("password_hash").is_none(),
        "password hash must never be serialized"
    );
}

#[tokio::test]
async fn login_with_wrong_password_returns_401() {
    let app = spawn_app().await;
    create_user(&app, "reader").await;

    let response = Client::new()
        .post(app.api_url("/auth/login"))
        .json(&json!({ "username": "reader", "password": "not the password" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_for_unknown_user_returns_401() {
    let app = spawn_app().await;

    let response = Client::new()
        .post(app.api_url("/auth/login"))
        .json(&json!({ "username": "ghost", "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let app = spawn_app().await;
    let user = create_user(&app, "reader").await;
    let client = Client::new();

    let response = client
        .post(app.api_url("/auth/logout"))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(app.api_url("/books"))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_bearer_token_is_rejected() {
    let app = spawn_app().await;

    let response = Client::new()
        .get(app.api_url("/books"))
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_with_emailed_code_creates_a_working_account() {
    let app = spawn_app().await;

    let client = register_via_forms(&app, "newreader", "New@Example.com").await;

    let response = client
        .get(app.page_url("/"))
        .send()
        .await
        .expect("Failed to load home page");
    assert_eq!(response.status(), StatusCode::OK);

    let user = app
        .user_repo
        .get_by_username("newreader")
        .await
        .expect("user should exist after verification");
    assert_eq!(user.email, "new@example.com");
}

#[tokio::test]
async fn registering_a_taken_username_returns_409() {
    let app = spawn_app().await;
    create_user(&app, "taken").await;

    let response = post_form(
        &browser(),
        &app.page_url("/register"),
        &[
            ("username", "taken"),
            ("email", "other@example.com"),
            ("password", TEST_PASSWORD),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = response.text().await.expect("Failed to read body");
    assert!(body.contains("already registered"));
}

#[tokio::test]
async fn registering_with_a_short_password_returns_400() {
    let app = spawn_app().await;

    let response = post_form(
        &browser(),
        &app.page_url("/register"),
        &[
            ("username", "shorty"),
            ("email", "shorty@example.com"),
            ("password", "abc"),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_verification_code_is_rejected_and_can_be_retried() {
    let app = spawn_app().await;
    let client = browser();

    post_form(
        &client,
        &app.page_url("/register"),
        &[
            ("username", "retry"),
            ("email", "retry@example.com"),
            ("password", TEST_PASSWORD),
        ],
    )
    .await;
    let code = last_verification_code(&app).await;
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let response = post_form(
        &client,
        &app.page_url("/verify"),
        &[("email", "retry@example.com"), ("code", wrong)],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response.text().await.expect("Failed to read body");
    assert!(body.contains("invalid verification code"));

    let response = post_form(
        &client,
        &app.page_url("/verify"),
        &[("email", "retry@example.com"), ("code", code.as_str())],
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let token = login(&app, "retry", TEST_PASSWORD).await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn verifying_without_a_pending_registration_returns_400() {
    let app = spawn_app().await;

    let response = post_form(
        &browser(),
        &app.page_url("/verify"),
        &[("email", "nobody@example.com"), ("code", "123456")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn repeated_login_attempts_are_rate_limited() {
    let app = spawn_app().await;
    let client = Client::new();

    let mut statuses = Vec::new();
    for _ in 0..11 {
        let response = client
            .post(app.api_url("/auth/login"))
            .json(&json!({ "username": "ghost", "password": "wrong" }))
            .send()
            .await
            .expect("Failed to send request");
        statuses.push(response.status());
    }

    assert!(statuses[..10].iter().all(|s| *s == StatusCode::UNAUTHORIZED));
    assert_eq!(statuses[10], StatusCode::TOO_MANY_REQUESTS);
}
