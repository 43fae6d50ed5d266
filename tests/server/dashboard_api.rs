use readlog::domain::dashboard::{DashboardSnapshot, Metric, ReaderProfile};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::helpers::{TestApp, TestUser, create_user, date, insert_book, new_book, spawn_app};

async fn seed_book(app: &TestApp, user: &TestUser, title: &str, read: &str, rating: f64, tags: &str) {
    let mut book = new_book(title, "Author");
    book.date_read = Some(date(read));
    book.rating = Some(rating);
    book.tags = Some(tags.to_string());
    insert_book(app, user, book).await;
}

async fn fetch(app: &TestApp, user: &TestUser, query: &str) -> reqwest::Response {
    Client::new()
        .get(app.api_url(&format!("/dashboard{query}")))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn dashboard_aggregates_the_requested_year() {
    let app = spawn_app().await;
    let user = create_user(&app, "reader").await;

    seed_book(&app, &user, "One", "2023-01-10", 4.0, "Fiction, classics").await;
    seed_book(&app, &user, "Two", "2023-01-25", 5.0, "fiction").await;
    seed_book(&app, &user, "Three", "2023-06-02", 3.0, "history").await;
    seed_book(&app, &user, "Old", "2022-11-30", 2.0, "history").await;
    insert_book(&app, &user, new_book("Unread", "Author")).await;

    let response = fetch(&app, &user, "?year=2023").await;
    assert_eq!(response.status(), StatusCode::OK);
    let snapshot: DashboardSnapshot = response.json().await.expect("Failed to parse snapshot");

    assert_eq!(snapshot.selected_year, 2023);
    assert_eq!(snapshot.available_years, vec![2023, 2022]);
    assert_eq!(snapshot.total_for_year, 3);
    assert_eq!(snapshot.monthly_counts.len(), 2);
    assert_eq!(snapshot.best_month.month, "Jan");
    assert_eq!(snapshot.best_month.count, 2);
    assert!((snapshot.average_per_month - 0.3).abs() < f64::EPSILON);
    assert_eq!(snapshot.average_rating, Metric::Value(4.0));
    assert_eq!(snapshot.top_tag, Metric::Value("fiction".to_string()));
    assert_eq!(snapshot.previous_year_total, 1);
    assert_eq!(snapshot.year_over_year_delta_percent, Some(200));
    assert_eq!(snapshot.reader_profile, ReaderProfile::Occasional);
}

#[tokio::test]
async fn empty_year_serializes_sentinels() {
    let app = spawn_app().await;
    let user = create_user(&app, "reader").await;
    seed_book(&app, &user, "Elsewhere", "2021-05-05", 4.0, "poetry").await;

    let response = fetch(&app, &user, "?year=2020").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse body");

    assert_eq!(body["total_for_year"], 0);
    assert_eq!(body["average_rating"], "-");
    assert_eq!(body["top_tag"], "-");
    assert_eq!(body["best_month"]["month"], "-");
    assert_eq!(body["reader_profile"], "new reader");
    assert!(body["year_over_year_delta_percent"].is_null());
}

#[tokio::test]
async fn invalid_year_falls_back_to_the_current_year() {
    let app = spawn_app().await;
    let user = create_user(&app, "reader").await;
    let current_year = chrono::Datelike::year(&chrono::Utc::now());

    let response = fetch(&app, &user, "?year=not-a-year").await;
    assert_eq!(response.status(), StatusCode::OK);
    let snapshot: DashboardSnapshot = response.json().await.expect("Failed to parse snapshot");

    assert_eq!(snapshot.selected_year, current_year);
    assert_eq!(snapshot.available_years, vec![current_year]);
}

#[tokio::test]
async fn dashboard_only_counts_the_callers_books() {
    let app = spawn_app().await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;
    seed_book(&app, &alice, "Hers", "2024-02-01", 4.0, "a").await;
    seed_book(&app, &bob, "His", "2024-02-01", 1.0, "b").await;
    seed_book(&app, &bob, "Also his", "2024-03-01", 1.0, "b").await;

    let snapshot: DashboardSnapshot = fetch(&app, &alice, "?year=2024")
        .await
        .json()
        .await
        .expect("Failed to parse snapshot");

    assert_eq!(snapshot.total_for_year, 1);
    assert_eq!(snapshot.top_tag, Metric::Value("a".to_string()));
}

#[tokio::test]
async fn dashboard_requires_authentication() {
    let app = spawn_app().await;

    let response = Client::new()
        .get(app.api_url("/dashboard"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
