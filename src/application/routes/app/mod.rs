pub(super) mod auth;
mod books;
mod dashboard;
mod home;
mod profile;

use axum::response::IntoResponse;
use axum::routing::{get, post};

use crate::application::state::AppState;

/// Generate a static asset handler that serves an embedded file with cache headers.
macro_rules! static_asset_str {
    ($name:ident, $path:literal, $content_type:literal) => {
        async fn $name() -> impl IntoResponse {
            (
                [
                    ("content-type", $content_type),
                    ("cache-control", "public, max-age=604800"),
                ],
                include_str!($path),
            )
        }
    };
}

pub(super) fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(home::home_page))
        .route("/login", get(auth::login_page))
        .route("/logout", post(auth::logout))
        .route("/register", get(auth::register_page))
        .route("/books/new", get(books::new_book_page))
        .route("/books", post(books::create_book))
        .route(
            "/books/{id}/edit",
            get(books::edit_book_page).post(books::update_book),
        )
        .route("/books/{id}/delete", post(books::delete_book))
        .route("/dashboard", get(dashboard::dashboard_page))
        .route(
            "/profile",
            get(profile::profile_page).post(profile::update_profile),
        )
        .route("/favorites", post(profile::set_favorites))
        .route("/delete-account", post(profile::delete_account))
        .route("/static/css/styles.css", get(styles))
        .route("/health", get(health))
}

/// Credential form posts, rate limited by the caller.
pub(super) fn auth_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/login", post(auth::login_submit))
        .route("/register", post(auth::register_submit))
        .route("/verify", post(auth::verify_submit))
}

static_asset_str!(
    styles,
    "../../../../static/css/styles.css",
    "text/css; charset=utf-8"
);

async fn health() -> impl IntoResponse {
    ([("content-type", "application/json")], r#"{"status":"ok"}"#)
}
