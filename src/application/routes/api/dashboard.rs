use axum::Json;
use axum::extract::{Query, State};

use crate::application::auth::AuthenticatedUser;
use crate::application::errors::ApiError;
use crate::application::routes::support::YearQuery;
use crate::application::services::dashboard::compute_dashboard_for;
use crate::application::state::AppState;
use crate::domain::dashboard::DashboardSnapshot;

#[tracing::instrument(skip(state, auth))]
pub(crate) async fn get_dashboard(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<YearQuery>,
) -> Result<Json<DashboardSnapshot>, ApiError> {
    let snapshot = compute_dashboard_for(&*state.book_repo, auth.user.id, query.resolve()).await?;
    Ok(Json(snapshot))
}
