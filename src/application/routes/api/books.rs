use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::application::auth::AuthenticatedUser;
use crate::application::errors::{ApiError, AppError};
use crate::application::routes::support::{
    FlexiblePayload, PayloadSource, SearchQuery, empty_string_as_none,
};
use crate::application::state::AppState;
use crate::domain::book_items::{Book, NewBook, UpdateBook};
use crate::domain::ids::BookId;

/// A new book as submitted by the API or the add-book form. Blank form
/// fields arrive as empty strings and are treated as absent.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct BookSubmission {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub date_read: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
}

impl From<BookSubmission> for NewBook {
    fn from(submission: BookSubmission) -> Self {
        Self {
            title: submission.title,
            author: submission.author,
            rating: submission.rating,
            notes: submission.notes,
            date_read: submission.date_read,
            tags: submission.tags,
            cover_url: submission.cover_url,
        }
    }
}

impl BookSubmission {
    /// Full replacement of every editable field, as sent by the edit form.
    pub fn into_update(self) -> UpdateBook {
        UpdateBook {
            title: Some(self.title),
            author: Some(self.author),
            rating: Some(self.rating),
            notes: Some(self.notes),
            date_read: Some(self.date_read),
            tags: Some(self.tags),
            cover_url: Some(self.cover_url),
        }
    }
}

#[tracing::instrument(skip(state, auth, payload))]
pub(crate) async fn create_book(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    payload: FlexiblePayload<BookSubmission>,
) -> Result<Response, ApiError> {
    let (submission, source) = payload.into_parts();
    let book = state
        .book_service
        .create(auth.user.id, submission.into())
        .await?;

    if matches!(source, PayloadSource::Form) {
        Ok(Redirect::to("/").into_response())
    } else {
        Ok((StatusCode::CREATED, Json(book)).into_response())
    }
}

#[tracing::instrument(skip(state, auth))]
pub(crate) async fn list_books(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let books = state
        .book_repo
        .search(auth.user.id, query.term())
        .await
        .map_err(AppError::from)?;
    Ok(Json(books))
}

#[tracing::instrument(skip(state, auth))]
pub(crate) async fn get_book(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<Book>, ApiError> {
    let book = state
        .book_repo
        .get(auth.user.id, BookId::new(id))
        .await
        .map_err(AppError::from)?;
    Ok(Json(book))
}

#[tracing::instrument(skip(state, auth, update))]
pub(crate) async fn update_book(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(update): Json<UpdateBook>,
) -> Result<Json<Book>, ApiError> {
    let book = state
        .book_service
        .update(auth.user.id, BookId::new(id), update)
        .await?;
    Ok(Json(book))
}

#[tracing::instrument(skip(state, auth))]
pub(crate) async fn delete_book(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .book_service
        .delete(auth.user.id, BookId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
