use askama::Template;

use super::views::{BookFormView, BookView, DashboardView, FavoriteOptionView};
use crate::domain::users::ProfileSummary;

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub nav_active: &'static str,
    pub is_authenticated: bool,
    pub version: &'static str,
    pub username: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/register.html")]
pub struct RegisterTemplate {
    pub nav_active: &'static str,
    pub is_authenticated: bool,
    pub version: &'static str,
    pub username: String,
    pub email: String,
    pub min_password_length: usize,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/verify.html")]
pub struct VerifyTemplate {
    pub nav_active: &'static str,
    pub is_authenticated: bool,
    pub version: &'static str,
    pub email: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub nav_active: &'static str,
    pub is_authenticated: bool,
    pub version: &'static str,
    pub username: String,
    pub search: String,
    pub books: Vec<BookView>,
}

#[derive(Template)]
#[template(path = "pages/book_form.html")]
pub struct BookFormTemplate {
    pub nav_active: &'static str,
    pub is_authenticated: bool,
    pub version: &'static str,
    pub form: BookFormView,
}

#[derive(Template)]
#[template(path = "pages/dashboard.html")]
pub struct DashboardTemplate {
    pub nav_active: &'static str,
    pub is_authenticated: bool,
    pub version: &'static str,
    pub dashboard: DashboardView,
}

#[derive(Template)]
#[template(path = "pages/profile.html")]
pub struct ProfileTemplate {
    pub nav_active: &'static str,
    pub is_authenticated: bool,
    pub version: &'static str,
    pub profile: ProfileSummary,
    pub bio: String,
    pub favorites: Vec<BookView>,
    pub favorite_options: Vec<FavoriteOptionView>,
    pub books: Vec<BookView>,
    pub max_favorites: usize,
    pub error: Option<String>,
}

pub fn render_template<T: Template>(template: T) -> Result<String, askama::Error> {
    template.render()
}
