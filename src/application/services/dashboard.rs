use std::time::Instant;

use tracing::info;

use crate::application::errors::AppError;
use crate::domain::dashboard::{DashboardRequest, DashboardSnapshot, compute_dashboard};
use crate::domain::ids::UserId;
use crate::domain::repositories::BookRepository;

/// Load the user's books in one read and aggregate them for `year`
/// (the current year when `None`). Logs the computation time.
pub async fn compute_dashboard_for(
    repo: &dyn BookRepository,
    user_id: UserId,
    year: Option<i32>,
) -> Result<DashboardSnapshot, AppError> {
    let start = Instant::now();
    let request = DashboardRequest::new(user_id, year);

    let books = repo.list_for_user(user_id).await?;
    let snapshot = compute_dashboard(&books, &request)?;

    info!(
        duration_ms = start.elapsed().as_millis(),
        %user_id,
        year = snapshot.selected_year,
        books = books.len(),
        "dashboard computed"
    );
    Ok(snapshot)
}
