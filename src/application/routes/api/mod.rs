pub(crate) mod auth;
pub(crate) mod books;
pub(crate) mod dashboard;
pub(crate) mod profile;

use axum::routing::{get, post, put};

use crate::application::state::AppState;

pub(super) fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/{id}",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/dashboard", get(dashboard::get_dashboard))
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route("/profile/favorites", put(profile::set_favorites))
        .route("/users/{id}/avatar", get(profile::get_avatar))
        .route("/auth/logout", post(auth::logout))
}

/// Credential endpoints, rate limited by the caller.
pub(super) fn auth_router() -> axum::Router<AppState> {
    axum::Router::new().route("/auth/login", post(auth::login))
}
