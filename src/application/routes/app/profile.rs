use std::collections::HashSet;

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use tower_cookies::Cookies;
use tracing::warn;

use crate::application::auth::{PageUser, clear_session_cookie};
use crate::application::errors::{AppError, map_app_error};
use crate::application::routes::api::profile::ProfileUpdate;
use crate::application::routes::render_html;
use crate::application::state::AppState;
use crate::domain::favorites::MAX_FAVORITES;
use crate::domain::ids::BookId;
use crate::domain::users::User;
use crate::presentation::web::templates::ProfileTemplate;
use crate::presentation::web::views::{BookView, FavoriteOptionView};

async fn profile_response(
    state: &AppState,
    user: &User,
    error: Option<String>,
) -> Result<Response, StatusCode> {
    let profile = state
        .profile_service
        .summary(user)
        .await
        .map_err(map_app_error)?;
    let favorites = state
        .profile_service
        .favorites(user.id)
        .await
        .map_err(map_app_error)?;
    let books = state
        .book_repo
        .search(user.id, None)
        .await
        .map_err(|e| map_app_error(e.into()))?;

    let chosen: HashSet<BookId> = favorites.iter().map(|b| b.id).collect();
    let status = if error.is_some() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };

    let template = ProfileTemplate {
        nav_active: "profile",
        is_authenticated: true,
        version: crate::VERSION,
        bio: profile.bio.clone().unwrap_or_default(),
        profile,
        favorites: favorites.into_iter().map(BookView::from).collect(),
        favorite_options: FavoriteOptionView::from_books(&books, &chosen),
        books: books.into_iter().map(BookView::from).collect(),
        max_favorites: MAX_FAVORITES,
        error,
    };

    render_html(template).map(|html| (status, html).into_response())
}

#[tracing::instrument(skip(state, user))]
pub(crate) async fn profile_page(
    State(state): State<AppState>,
    PageUser(user): PageUser,
) -> Result<Response, StatusCode> {
    profile_response(&state, &user, None).await
}

#[tracing::instrument(skip(state, user, update))]
pub(crate) async fn update_profile(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Form(update): Form<ProfileUpdate>,
) -> Result<Response, StatusCode> {
    match state
        .profile_service
        .update(user.id, update.bio, update.avatar.as_deref())
        .await
    {
        Ok(_) => Ok(Redirect::to("/profile").into_response()),
        Err(AppError::Validation(message)) => profile_response(&state, &user, Some(message)).await,
        Err(err) => Err(map_app_error(err)),
    }
}

/// Checkbox submissions repeat the `favorites` key once per ticked book.
fn favorite_ids(fields: &[(String, String)]) -> Vec<BookId> {
    fields
        .iter()
        .filter(|(key, _)| key == "favorites")
        .filter_map(|(_, value)| value.trim().parse::<i64>().ok())
        .map(BookId::new)
        .collect()
}

#[tracing::instrument(skip(state, user, fields))]
pub(crate) async fn set_favorites(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, StatusCode> {
    let requested = favorite_ids(&fields);
    match state
        .profile_service
        .set_favorites(user.id, &requested)
        .await
    {
        Ok(_) => Ok(Redirect::to("/profile").into_response()),
        Err(AppError::Validation(message)) => profile_response(&state, &user, Some(message)).await,
        Err(err) => Err(map_app_error(err)),
    }
}

#[tracing::instrument(skip(state, user, cookies))]
pub(crate) async fn delete_account(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    cookies: Cookies,
) -> Result<Redirect, StatusCode> {
    if let Err(err) = state.account_service.delete_account(user.id).await {
        warn!(error = %err, user_id = %user.id, "failed to delete account");
        return Err(map_app_error(err));
    }
    clear_session_cookie(&cookies);
    Ok(Redirect::to("/register"))
}
