use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use tower_cookies::Cookies;

use crate::application::auth::{SESSION_COOKIE_NAME, clear_session_cookie, set_session_cookie};
use crate::application::errors::ApiError;
use crate::application::state::AppState;
use crate::domain::sessions::{Credentials, LoginResponse};

/// Exchange credentials for a session token. The token is returned for CLI
/// use and also set as the session cookie.
#[tracing::instrument(skip(state, cookies, credentials), fields(username = %credentials.username))]
pub(crate) async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(credentials): Json<Credentials>,
) -> Result<Json<LoginResponse>, ApiError> {
    let response = state
        .account_service
        .login(&credentials.username, &credentials.password)
        .await?;
    set_session_cookie(&cookies, response.token.clone(), state.insecure_cookies);
    Ok(Json(response))
}

#[tracing::instrument(skip(state, cookies, headers))]
pub(crate) async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);
    let token = bearer.or_else(|| cookies.get(SESSION_COOKIE_NAME).map(|c| c.value().to_string()));

    if let Some(token) = token {
        state.account_service.logout(&token).await?;
    }
    clear_session_cookie(&cookies);
    Ok(StatusCode::NO_CONTENT)
}
