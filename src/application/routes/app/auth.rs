use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use tower_cookies::Cookies;
use tracing::warn;

use crate::application::auth::{
    SESSION_COOKIE_NAME, clear_session_cookie, set_session_cookie, user_from_cookies,
};
use crate::application::errors::{AppError, map_app_error};
use crate::application::routes::render_html;
use crate::application::services::{INVALID_CREDENTIALS, MIN_PASSWORD_LENGTH};
use crate::application::state::AppState;
use crate::presentation::web::templates::{LoginTemplate, RegisterTemplate, VerifyTemplate};

#[derive(Debug, Deserialize)]
pub(crate) struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    code: String,
}

fn login_template(username: String, error: Option<String>) -> LoginTemplate {
    LoginTemplate {
        nav_active: "login",
        is_authenticated: false,
        version: crate::VERSION,
        username,
        error,
    }
}

fn register_template(username: String, email: String, error: Option<String>) -> RegisterTemplate {
    RegisterTemplate {
        nav_active: "register",
        is_authenticated: false,
        version: crate::VERSION,
        username,
        email,
        min_password_length: MIN_PASSWORD_LENGTH,
        error,
    }
}

fn verify_template(email: String, error: Option<String>) -> VerifyTemplate {
    VerifyTemplate {
        nav_active: "register",
        is_authenticated: false,
        version: crate::VERSION,
        email,
        error,
    }
}

#[tracing::instrument(skip(state, cookies))]
pub(crate) async fn login_page(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Response, StatusCode> {
    if user_from_cookies(&state, &cookies).await.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    render_html(login_template(String::new(), None)).map(IntoResponse::into_response)
}

#[tracing::instrument(skip(state, cookies, form), fields(username = %form.username))]
pub(crate) async fn login_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Result<Response, StatusCode> {
    match state
        .account_service
        .login(&form.username, &form.password)
        .await
    {
        Ok(response) => {
            set_session_cookie(&cookies, response.token, state.insecure_cookies);
            Ok(Redirect::to("/").into_response())
        }
        Err(AppError::Unauthorized) => {
            let template = login_template(form.username, Some(INVALID_CREDENTIALS.to_string()));
            render_html(template).map(|html| (StatusCode::UNAUTHORIZED, html).into_response())
        }
        Err(err) => Err(map_app_error(err)),
    }
}

#[tracing::instrument(skip(state, cookies))]
pub(crate) async fn logout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    if let Some(cookie) = cookies.get(SESSION_COOKIE_NAME)
        && let Err(err) = state.account_service.logout(cookie.value()).await
    {
        warn!(error = %err, "failed to delete session on logout");
    }
    clear_session_cookie(&cookies);
    Redirect::to("/login")
}

#[tracing::instrument]
pub(crate) async fn register_page() -> Result<Response, StatusCode> {
    render_html(register_template(String::new(), String::new(), None))
        .map(IntoResponse::into_response)
}

#[tracing::instrument(skip(state, form), fields(username = %form.username))]
pub(crate) async fn register_submit(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, StatusCode> {
    match state
        .account_service
        .start_registration(&form.username, &form.email, &form.password)
        .await
    {
        Ok(email) => render_html(verify_template(email, None)).map(IntoResponse::into_response),
        Err(err @ (AppError::Validation(_) | AppError::Conflict(_))) => {
            let status = err.status_code();
            let template = register_template(form.username, form.email, Some(err.to_string()));
            render_html(template).map(|html| (status, html).into_response())
        }
        Err(err) => Err(map_app_error(err)),
    }
}

#[tracing::instrument(skip(state, form), fields(email = %form.email))]
pub(crate) async fn verify_submit(
    State(state): State<AppState>,
    Form(form): Form<VerifyForm>,
) -> Result<Response, StatusCode> {
    match state
        .account_service
        .verify_registration(&form.email, &form.code)
        .await
    {
        Ok(_) => Ok(Redirect::to("/login").into_response()),
        Err(err @ AppError::Validation(_)) => {
            let template = verify_template(form.email, Some(err.to_string()));
            render_html(template)
                .map(|html| (StatusCode::BAD_REQUEST, html).into_response())
        }
        Err(err @ AppError::Conflict(_)) => {
            let template =
                register_template(String::new(), form.email, Some(err.to_string()));
            render_html(template).map(|html| (StatusCode::CONFLICT, html).into_response())
        }
        Err(err) => Err(map_app_error(err)),
    }
}
