use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};

use crate::application::auth::PageUser;
use crate::application::errors::{AppError, map_app_error};
use crate::application::routes::api::books::BookSubmission;
use crate::application::routes::render_html;
use crate::application::state::AppState;
use crate::domain::ids::BookId;
use crate::presentation::web::templates::BookFormTemplate;
use crate::presentation::web::views::BookFormView;

fn form_page(form: BookFormView, status: StatusCode) -> Result<Response, StatusCode> {
    let template = BookFormTemplate {
        nav_active: "new",
        is_authenticated: true,
        version: crate::VERSION,
        form,
    };
    render_html(template).map(|html| (status, html).into_response())
}

/// Rebuild the form from a rejected submission so nothing typed is lost.
fn refill(mut form: BookFormView, submission: &BookSubmission) -> BookFormView {
    form.title.clone_from(&submission.title);
    form.author.clone_from(&submission.author);
    form.rating = submission.rating.map(|r| r.to_string()).unwrap_or_default();
    form.date_read = submission
        .date_read
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    form.tags = submission.tags.clone().unwrap_or_default();
    form.notes = submission.notes.clone().unwrap_or_default();
    form.cover_url = submission.cover_url.clone().unwrap_or_default();
    form
}

#[tracing::instrument(skip(_user))]
pub(crate) async fn new_book_page(PageUser(_user): PageUser) -> Result<Response, StatusCode> {
    form_page(BookFormView::new_book(), StatusCode::OK)
}

#[tracing::instrument(skip(state, user, submission))]
pub(crate) async fn create_book(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Form(submission): Form<BookSubmission>,
) -> Result<Response, StatusCode> {
    let form = refill(BookFormView::new_book(), &submission);
    match state.book_service.create(user.id, submission.into()).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(AppError::Validation(message)) => {
            form_page(form.with_error(message), StatusCode::BAD_REQUEST)
        }
        Err(err) => Err(map_app_error(err)),
    }
}

#[tracing::instrument(skip(state, user))]
pub(crate) async fn edit_book_page(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Path(id): Path<i64>,
) -> Result<Response, StatusCode> {
    let book = state
        .book_repo
        .get(user.id, BookId::new(id))
        .await
        .map_err(|e| map_app_error(e.into()))?;
    form_page(BookFormView::edit(&book), StatusCode::OK)
}

#[tracing::instrument(skip(state, user, submission))]
pub(crate) async fn update_book(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Path(id): Path<i64>,
    Form(submission): Form<BookSubmission>,
) -> Result<Response, StatusCode> {
    let id = BookId::new(id);
    let existing = state
        .book_repo
        .get(user.id, id)
        .await
        .map_err(|e| map_app_error(e.into()))?;
    let form = refill(BookFormView::edit(&existing), &submission);

    match state
        .book_service
        .update(user.id, id, submission.into_update())
        .await
    {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(AppError::Validation(message)) => {
            form_page(form.with_error(message), StatusCode::BAD_REQUEST)
        }
        Err(err) => Err(map_app_error(err)),
    }
}

#[tracing::instrument(skip(state, user))]
pub(crate) async fn delete_book(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Path(id): Path<i64>,
) -> Result<Redirect, StatusCode> {
    state
        .book_service
        .delete(user.id, BookId::new(id))
        .await
        .map_err(map_app_error)?;
    Ok(Redirect::to("/"))
}
