use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};

use crate::application::auth::AuthenticatedUser;
use crate::application::errors::ApiError;
use crate::application::routes::support::{FlexiblePayload, PayloadSource};
use crate::application::state::AppState;
use crate::domain::book_items::Book;
use crate::domain::ids::{BookId, UserId};
use crate::domain::users::ProfileSummary;

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: ProfileSummary,
    pub favorites: Vec<Book>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProfileUpdate {
    #[serde(default)]
    pub bio: Option<String>,
    /// Base64 image data URL.
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FavoritesUpdate {
    #[serde(default)]
    pub book_ids: Vec<i64>,
}

#[tracing::instrument(skip(state, auth))]
pub(crate) async fn get_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state.profile_service.summary(&auth.user).await?;
    let favorites = state.profile_service.favorites(auth.user.id).await?;
    Ok(Json(ProfileResponse { profile, favorites }))
}

#[tracing::instrument(skip(state, auth, payload))]
pub(crate) async fn update_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    payload: FlexiblePayload<ProfileUpdate>,
) -> Result<Response, ApiError> {
    let (update, source) = payload.into_parts();
    let user = state
        .profile_service
        .update(auth.user.id, update.bio, update.avatar.as_deref())
        .await?;

    if matches!(source, PayloadSource::Form) {
        return Ok(Redirect::to("/profile").into_response());
    }
    let profile = state.profile_service.summary(&user).await?;
    Ok(Json(profile).into_response())
}

#[tracing::instrument(skip(state, auth, update))]
pub(crate) async fn set_favorites(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(update): Json<FavoritesUpdate>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let requested: Vec<BookId> = update.book_ids.into_iter().map(BookId::new).collect();
    let favorites = state
        .profile_service
        .set_favorites(auth.user.id, &requested)
        .await?;
    Ok(Json(favorites))
}

/// Avatars are public so profile pages and `<img>` tags can load them.
#[tracing::instrument(skip(state))]
pub(crate) async fn get_avatar(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Response, ApiError> {
    let avatar = state.profile_service.avatar(UserId::new(user_id)).await?;
    Ok((
        [
            (header::CONTENT_TYPE, avatar.content_type),
            (header::CACHE_CONTROL, "private, max-age=300".to_string()),
        ],
        avatar.data,
    )
        .into_response())
}
