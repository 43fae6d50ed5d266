use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::auth::PageUser;
use crate::application::errors::map_app_error;
use crate::application::routes::render_html;
use crate::application::routes::support::YearQuery;
use crate::application::services::dashboard::compute_dashboard_for;
use crate::application::state::AppState;
use crate::presentation::web::templates::DashboardTemplate;
use crate::presentation::web::views::DashboardView;

#[tracing::instrument(skip(state, user))]
pub(crate) async fn dashboard_page(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Query(query): Query<YearQuery>,
) -> Result<Response, StatusCode> {
    let snapshot = compute_dashboard_for(&*state.book_repo, user.id, query.resolve())
        .await
        .map_err(map_app_error)?;

    let template = DashboardTemplate {
        nav_active: "dashboard",
        is_authenticated: true,
        version: crate::VERSION,
        dashboard: DashboardView::from_snapshot(&snapshot),
    };

    render_html(template).map(IntoResponse::into_response)
}
