use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::auth::PageUser;
use crate::application::errors::map_app_error;
use crate::application::routes::render_html;
use crate::application::routes::support::SearchQuery;
use crate::application::state::AppState;
use crate::presentation::web::templates::HomeTemplate;
use crate::presentation::web::views::BookView;

/// The user's log, newest first, optionally filtered by title or author.
#[tracing::instrument(skip(state, user))]
pub(crate) async fn home_page(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Query(query): Query<SearchQuery>,
) -> Result<Response, StatusCode> {
    let books = state
        .book_repo
        .search(user.id, query.term())
        .await
        .map_err(|e| map_app_error(e.into()))?;

    let template = HomeTemplate {
        nav_active: "home",
        is_authenticated: true,
        version: crate::VERSION,
        username: user.username,
        search: query.term().unwrap_or_default().to_string(),
        books: books.into_iter().map(BookView::from).collect(),
    };

    render_html(template).map(IntoResponse::into_response)
}
