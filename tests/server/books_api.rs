use readlog::domain::book_items::Book;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use crate::helpers::{create_user, date, insert_book, mock_cover_search, new_book, spawn_app};

#[tokio::test]
async fn creating_a_book_returns_201_with_the_stored_record() {
    let app = spawn_app().await;
    let user = create_user(&app, "reader").await;

    let response = Client::new()
        .post(app.api_url("/books"))
        .bearer_auth(&user.token)
        .json(&json!({
            "title": "  The Dispossessed ",
            "author": "Ursula K. Le Guin",
            "rating": 4.5,
            "date_read": "2024-03-09",
            "tags": "sci-fi, classics",
            "notes": "Anarres and Urras"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CREATED);

    let book: Book = response.json().await.expect("Failed to parse response");
    assert_eq!(book.title, "The Dispossessed");
    assert_eq!(book.rating, Some(4.5));
    assert_eq!(book.date_read, Some(date("2024-03-09")));
    assert_eq!(book.user_id, user.id);
}

#[tokio::test]
async fn creating_a_book_without_cover_uses_the_lookup() {
    let app = spawn_app().await;
    mock_cover_search(&app, 8_231_856).await;
    let user = create_user(&app, "reader").await;

    let book: Book = Client::new()
        .post(app.api_url("/books"))
        .bearer_auth(&user.token)
        .json(&json!({ "title": "Kindred", "author": "Octavia E. Butler" }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(
        book.cover_url.as_deref(),
        Some("https://covers.openlibrary.org/b/id/8231856-L.jpg")
    );
}

#[tokio::test]
async fn creating_a_book_succeeds_when_the_lookup_finds_nothing() {
    let app = spawn_app().await;
    let user = create_user(&app, "reader").await;

    let response = Client::new()
        .post(app.api_url("/books"))
        .bearer_auth(&user.token)
        .json(&json!({ "title": "Obscure", "author": "Nobody" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let book: Book = response.json().await.expect("Failed to parse response");
    assert_eq!(book.cover_url, None);
}

#[tokio::test]
async fn creating_a_book_with_blank_title_returns_400() {
    let app = spawn_app().await;
    let user = create_user(&app, "reader").await;

    let response = Client::new()
        .post(app.api_url("/books"))
        .bearer_auth(&user.token)
        .json(&json!({ "title": "   ", "author": "Someone" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(body["message"], "title is required");
}

#[tokio::test]
async fn creating_a_book_with_out_of_range_rating_returns_400() {
    let app = spawn_app().await;
    let user = create_user(&app, "reader").await;

    let response = Client::new()
        .post(app.api_url("/books"))
        .bearer_auth(&user.token)
        .json(&json!({ "title": "Dune", "author": "Frank Herbert", "rating": 7 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn books_api_requires_authentication() {
    let app = spawn_app().await;

    let response = Client::new()
        .get(app.api_url("/books"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn listing_books_is_newest_first_and_scoped_to_the_owner() {
    let app = spawn_app().await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;

    insert_book(&app, &alice, new_book("First", "A")).await;
    insert_book(&app, &alice, new_book("Second", "B")).await;
    insert_book(&app, &bob, new_book("Not Alice's", "C")).await;

    let books: Vec<Book> = Client::new()
        .get(app.api_url("/books"))
        .bearer_auth(&alice.token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");

    let titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Second", "First"]);
}

#[tokio::test]
async fn search_matches_title_or_author_case_insensitively() {
    let app = spawn_app().await;
    let user = create_user(&app, "reader").await;

    insert_book(&app, &user, new_book("Piranesi", "Susanna Clarke")).await;
    insert_book(&app, &user, new_book("Circe", "Madeline Miller")).await;

    let books: Vec<Book> = Client::new()
        .get(app.api_url("/books?search=CLARKE"))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Piranesi");

    insert_book(&app, &user, new_book("ÉTUDES", "Ângela Ré")).await;
    for term in ["études", "ÉTUDES", "ângela"] {
        let books: Vec<Book> = Client::new()
            .get(app.api_url("/books"))
            .query(&[("search", term)])
            .bearer_auth(&user.token)
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse response");

        assert_eq!(books.len(), 1, "search={term}");
        assert_eq!(books[0].title, "ÉTUDES");
    }
}

#[tokio::test]
async fn another_users_book_is_not_found() {
    let app = spawn_app().await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;
    let book = insert_book(&app, &alice, new_book("Private", "A")).await;

    let client = Client::new();
    let get = client
        .get(app.api_url(&format!("/books/{}", book.id)))
        .bearer_auth(&bob.token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(get.status(), StatusCode::NOT_FOUND);

    let delete = client
        .delete(app.api_url(&format!("/books/{}", book.id)))
        .bearer_auth(&bob.token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(delete.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn updating_a_book_changes_only_supplied_fields() {
    let app = spawn_app().await;
    let user = create_user(&app, "reader").await;
    let mut seed = new_book("Middlemarch", "George Eliot");
    seed.rating = Some(4.0);
    seed.notes = Some("slow start".to_string());
    let book = insert_book(&app, &user, seed).await;

    let updated: Book = Client::new()
        .put(app.api_url(&format!("/books/{}", book.id)))
        .bearer_auth(&user.token)
        .json(&json!({ "rating": 5, "notes": null }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(updated.title, "Middlemarch");
    assert_eq!(updated.rating, Some(5.0));
    assert_eq!(updated.notes, None);
}

#[tokio::test]
async fn updating_with_an_empty_body_returns_400() {
    let app = spawn_app().await;
    let user = create_user(&app, "reader").await;
    let book = insert_book(&app, &user, new_book("Emma", "Jane Austen")).await;

    let response = Client::new()
        .put(app.api_url(&format!("/books/{}", book.id)))
        .bearer_auth(&user.token)
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_book_returns_204_and_removes_it() {
    let app = spawn_app().await;
    let user = create_user(&app, "reader").await;
    let book = insert_book(&app, &user, new_book("Gone", "Someone")).await;
    let client = Client::new();

    let response = client
        .delete(app.api_url(&format!("/books/{}", book.id)))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(app.api_url(&format!("/books/{}", book.id)))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
