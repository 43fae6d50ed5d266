use std::sync::Arc;
use std::time::Duration;

use readlog::application::routes::app_router;
use readlog::application::state::{AppState, AppStateConfig};
use readlog::domain::book_items::{Book, NewBook};
use readlog::domain::ids::UserId;
use readlog::domain::repositories::{BookRepository, UserRepository};
use readlog::domain::users::NewUser;
use readlog::infrastructure::auth::hash_password;
use readlog::infrastructure::database::{Database, DatabasePool};
use reqwest::Client;
use reqwest::redirect::Policy;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::AbortHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_PASSWORD: &str = "correct horse battery";

pub struct TestApp {
    pub address: String,
    #[allow(dead_code)]
    pub pool: DatabasePool,
    pub book_repo: Arc<dyn BookRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    /// Stands in for both OpenLibrary and the mail webhook.
    pub mock_server: MockServer,
    server_handle: AbortHandle,
}

/// A registered user and a bearer token for the API.
pub struct TestUser {
    pub id: UserId,
    pub username: String,
    pub token: String,
}

impl TestApp {
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }

    pub fn page_url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

/// Spawn the app on a random port over an in-memory database. The cover
/// lookup finds nothing unless a test mounts its own search mock first.
pub async fn spawn_app() -> TestApp {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mail"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&mock_server)
        .await;

    let database = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    database.migrate().await.expect("Failed to run migrations");

    let config = AppStateConfig {
        insecure_cookies: true,
        cover_lookup_url: mock_server.uri(),
        mail_webhook_url: Some(format!("{}/mail", mock_server.uri())),
        verification_ttl: Duration::from_secs(900),
        session_ttl: chrono::Duration::hours(24),
    };

    let pool = database.clone_pool();
    let state = AppState::from_database(&database, config);
    let book_repo = state.book_repo.clone();
    let user_repo = state.user_repo.clone();

    let app = app_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let local_addr = listener.local_addr().expect("Failed to get local address");
    let address = format!("http://{local_addr}");

    let server_handle = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await
        .expect("Server failed to start");
    })
    .abort_handle();

    TestApp {
        address,
        pool,
        book_repo,
        user_repo,
        mock_server,
        server_handle,
    }
}

/// Mount an OpenLibrary search response that yields cover id `cover_id`.
pub async fn mock_cover_search(app: &TestApp, cover_id: i64) {
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "docs": [{ "cover_i": cover_id, "isbn": [] }] })),
        )
        .mount(&app.mock_server)
        .await;
}

/// Insert a user straight into the database and log in through the API.
pub async fn create_user(app: &TestApp, username: &str) -> TestUser {
    let hash = hash_password(TEST_PASSWORD).expect("Failed to hash password");
    let user = app
        .user_repo
        .insert(NewUser::new(
            username.to_string(),
            format!("{username}@example.com"),
            hash,
        ))
        .await
        .expect("Failed to insert user");

    let token = login(app, username, TEST_PASSWORD).await;
    TestUser {
        id: user.id,
        username: username.to_string(),
        token,
    }
}

pub async fn login(app: &TestApp, username: &str, password: &str) -> String {
    let response = Client::new()
        .post(app.api_url("/auth/login"))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(response.status(), 200, "login should succeed");

    let body: Value = response.json().await.expect("Failed to parse login body");
    body["token"]
        .as_str()
        .expect("login response should carry a token")
        .to_string()
}

/// Client that keeps cookies and does not follow redirects, so tests can
/// assert the 303 itself.
pub fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

pub async fn post_form<T: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    form: &T,
) -> reqwest::Response {
    client
        .post(url)
        .form(form)
        .send()
        .await
        .expect("Failed to POST form")
}

/// Pull the most recent verification code out of the mail webhook requests.
pub async fn last_verification_code(app: &TestApp) -> String {
    let requests = app
        .mock_server
        .received_requests()
        .await
        .expect("request recording should be enabled");
    let email = requests
        .iter()
        .rev()
        .find(|r| r.url.path() == "/mail")
        .expect("a verification email should have been sent");
    let payload: Value = serde_json::from_slice(&email.body).expect("email should be JSON");
    let body = payload["body"].as_str().expect("email should have a body");

    body.split(|c: char| !c.is_ascii_digit())
        .find(|chunk| chunk.len() == 6)
        .expect("email body should contain a six-digit code")
        .to_string()
}

/// Sign up through the register and verify forms, returning the logged-in browser.
pub async fn register_via_forms(app: &TestApp, username: &str, email: &str) -> Client {
    let client = browser();
    let response = post_form(
        &client,
        &app.page_url("/register"),
        &[
            ("username", username),
            ("email", email),
            ("password", TEST_PASSWORD),
        ],
    )
    .await;
    assert_eq!(response.status(), 200, "register should show the verify page");

    let code = last_verification_code(app).await;
    let response = post_form(
        &client,
        &app.page_url("/verify"),
        &[("email", email), ("code", code.as_str())],
    )
    .await;
    assert_eq!(response.status(), 303, "verify should redirect to login");

    let response = post_form(
        &client,
        &app.page_url("/login"),
        &[("username", username), ("password", TEST_PASSWORD)],
    )
    .await;
    assert_eq!(response.status(), 303, "login should redirect home");
    client
}

pub fn new_book(title: &str, author: &str) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: author.to_string(),
        rating: None,
        notes: None,
        date_read: None,
        tags: None,
        cover_url: None,
    }
}

/// Insert a book directly, skipping the HTTP layer and the cover lookup.
pub async fn insert_book(app: &TestApp, user: &TestUser, book: NewBook) -> Book {
    app.book_repo
        .insert(user.id, book)
        .await
        .expect("Failed to insert book")
}

pub fn date(raw: &str) -> chrono::NaiveDate {
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid test date")
}

/// Asserts that the body contains full HTML page structure
pub fn assert_full_page(body: &str) {
    assert!(
        body.contains("<!DOCTYPE") || body.contains("<html"),
        "Expected full HTML page with DOCTYPE or <html> tag"
    );
}
