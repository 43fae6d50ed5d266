use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::Redirect,
};
use chrono::Utc;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};
use tracing::{Span, warn};

use crate::application::state::AppState;
use crate::domain::sessions::Session;
use crate::domain::users::User;
use crate::infrastructure::auth::hash_token;

pub const SESSION_COOKIE_NAME: &str = "readlog_session";

/// The user owning the current request, resolved from the session cookie or
/// an `Authorization: Bearer` token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth) = parts.extensions.get::<AuthenticatedUser>() {
            Span::current().record("user.id", tracing::field::display(&auth.user.id));
            return Ok(auth.clone());
        }

        if let Ok(cookies) = Cookies::from_request_parts(parts, state).await
            && let Some(user) = user_from_cookies(state, &cookies).await
        {
            Span::current().record("user.id", tracing::field::display(&user.id));
            return Ok(Self { user });
        }

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let auth_str = auth_header.to_str().map_err(|err| {
            warn!(error = %err, "authorization header contains invalid characters");
            StatusCode::UNAUTHORIZED
        })?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let user = user_from_token(state, token)
            .await
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Span::current().record("user.id", tracing::field::display(&user.id));
        Ok(Self { user })
    }
}

/// Signed-in user for HTML pages. Anonymous visitors are sent to `/login`.
#[derive(Debug, Clone)]
pub struct PageUser(pub User);

impl FromRequestParts<AppState> for PageUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|_| Redirect::to("/login"))?;
        let user = user_from_cookies(state, &cookies)
            .await
            .ok_or_else(|| Redirect::to("/login"))?;
        Span::current().record("user.id", tracing::field::display(&user.id));
        Ok(Self(user))
    }
}

/// Look up the live session behind a raw token. Expired sessions count as absent.
pub async fn session_for_token(state: &AppState, token: &str) -> Option<Session> {
    let session = match state.session_repo.get_by_token_hash(&hash_token(token)).await {
        Ok(session) => session,
        Err(crate::domain::RepositoryError::NotFound) => return None,
        Err(err) => {
            warn!(error = %err, "session lookup failed during authentication");
            return None;
        }
    };

    if session.is_expired(Utc::now()) {
        return None;
    }
    Some(session)
}

async fn user_from_token(state: &AppState, token: &str) -> Option<User> {
    let session = session_for_token(state, token).await?;
    match state.user_repo.get(session.user_id).await {
        Ok(user) => Some(user),
        Err(err) => {
            warn!(error = %err, user_id = %session.user_id, "user lookup failed for valid session");
            None
        }
    }
}

/// Resolve the signed-in user for page handlers, which redirect rather than
/// reject when this is `None`.
pub async fn user_from_cookies(state: &AppState, cookies: &Cookies) -> Option<User> {
    let cookie = cookies.get(SESSION_COOKIE_NAME)?;
    user_from_token(state, cookie.value()).await
}

/// Session referenced by the request cookie, if still valid.
pub async fn session_from_cookies(state: &AppState, cookies: &Cookies) -> Option<Session> {
    let cookie = cookies.get(SESSION_COOKIE_NAME)?;
    session_for_token(state, cookie.value()).await
}

pub fn set_session_cookie(cookies: &Cookies, token: String, insecure: bool) {
    let cookie = Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(!insecure)
        .build();
    cookies.add(cookie);
}

pub fn clear_session_cookie(cookies: &Cookies) {
    cookies.remove(Cookie::build(SESSION_COOKIE_NAME).path("/").build());
}
