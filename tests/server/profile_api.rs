use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};
use readlog::domain::book_items::Book;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use crate::helpers::{create_user, insert_book, new_book, spawn_app};

fn png_data_url(width: u32, height: u32) -> String {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 120, 40, 255]));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png)
        .expect("Failed to encode PNG");
    format!("data:image/png;base64,{}", STANDARD.encode(bytes.into_inner()))
}

#[tokio::test]
async fn profile_starts_without_bio_or_avatar() {
    let app = spawn_app().await;
    let user = create_user(&app, "reader").await;

    let body: Value = Client::new()
        .get(app.api_url("/profile"))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse body");

    assert_eq!(body["profile"]["username"], "reader");
    assert!(body["profile"]["bio"].is_null());
    assert_eq!(body["profile"]["has_avatar"], false);
    assert_eq!(body["favorites"], json!([]));
}

#[tokio::test]
async fn updating_the_bio_trims_and_blank_clears_it() {
    let app = spawn_app().await;
    let user = create_user(&app, "reader").await;
    let client = Client::new();

    let body: Value = client
        .put(app.api_url("/profile"))
        .bearer_auth(&user.token)
        .json(&json!({ "bio": "  Mostly sci-fi.  " }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse body");
    assert_eq!(body["bio"], "Mostly sci-fi.");

    let body: Value = client
        .put(app.api_url("/profile"))
        .bearer_auth(&user.token)
        .json(&json!({ "bio": "   " }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse body");
    assert!(body["bio"].is_null());
}

#[tokio::test]
async fn uploaded_avatar_is_resized_and_served_as_png() {
    let app = spawn_app().await;
    let user = create_user(&app, "reader").await;
    let client = Client::new();

    let response = client
        .put(app.api_url("/profile"))
        .bearer_auth(&user.token)
        .json(&json!({ "avatar": png_data_url(600, 300) }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse body");
    assert_eq!(body["has_avatar"], true);

    let avatar_url = body["avatar_url"].as_str().expect("avatar url expected");
    let response = client
        .get(app.page_url(avatar_url))
        .send()
        .await
        .expect("Failed to fetch avatar");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").and_then(|v| v.to_str().ok()),
        Some("image/png")
    );

    let bytes = response.bytes().await.expect("Failed to read avatar");
    let img = image::load_from_memory(&bytes).expect("avatar should decode");
    assert_eq!((img.width(), img.height()), (256, 128));
}

#[tokio::test]
async fn invalid_avatar_returns_400_and_keeps_the_bio() {
    let app = spawn_app().await;
    let user = create_user(&app, "reader").await;
    let client = Client::new();

    let response = client
        .put(app.api_url("/profile"))
        .bearer_auth(&user.token)
        .json(&json!({ "bio": "new bio", "avatar": "data:image/gif;base64,R0lGOD" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = client
        .get(app.api_url("/profile"))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse body");
    assert!(body["profile"]["bio"].is_null());
}

#[tokio::test]
async fn missing_avatar_returns_404() {
    let app = spawn_app().await;
    let user = create_user(&app, "reader").await;

    let response = Client::new()
        .get(app.api_url(&format!("/users/{}/avatar", user.id)))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn favorites_keep_order_drop_duplicates_and_cap_at_five() {
    let app = spawn_app().await;
    let user = create_user(&app, "reader").await;

    let mut ids = Vec::new();
    for n in 1..=6 {
        let book = insert_book(&app, &user, new_book(&format!("Book {n}"), "Author")).await;
        ids.push(i64::from(book.id));
    }
    let requested = vec![ids[2], ids[0], ids[2], ids[1], ids[3], ids[4], ids[5]];

    let favorites: Vec<Book> = Client::new()
        .put(app.api_url("/profile/favorites"))
        .bearer_auth(&user.token)
        .json(&json!({ "book_ids": requested }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse body");

    let titles: Vec<&str> = favorites.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Book 3", "Book 1", "Book 2", "Book 4", "Book 5"]);
}

#[tokio::test]
async fn favorites_cannot_include_another_users_book() {
    let app = spawn_app().await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;
    let own = insert_book(&app, &alice, new_book("Mine", "A")).await;
    let foreign = insert_book(&app, &bob, new_book("Bob's", "B")).await;
    let client = Client::new();

    client
        .put(app.api_url("/profile/favorites"))
        .bearer_auth(&alice.token)
        .json(&json!({ "book_ids": [i64::from(own.id)] }))
        .send()
        .await
        .expect("Failed to execute request");

    let response = client
        .put(app.api_url("/profile/favorites"))
        .bearer_auth(&alice.token)
        .json(&json!({ "book_ids": [i64::from(own.id), i64::from(foreign.id)] }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = client
        .get(app.api_url("/profile"))
        .bearer_auth(&alice.token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse body");
    assert_eq!(body["favorites"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn deleting_a_favorited_book_removes_it_from_favorites() {
    let app = spawn_app().await;
    let user = create_user(&app, "reader").await;
    let book = insert_book(&app, &user, new_book("Short-lived", "A")).await;
    let client = Client::new();

    client
        .put(app.api_url("/profile/favorites"))
        .bearer_auth(&user.token)
        .json(&json!({ "book_ids": [i64::from(book.id)] }))
        .send()
        .await
        .expect("Failed to execute request");
    client
        .delete(app.api_url(&format!("/books/{}", book.id)))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to execute request");

    let body: Value = client
        .get(app.api_url("/profile"))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse body");
    assert_eq!(body["favorites"], json!([]));
}
