use std::net::{SocketAddr, TcpStream};
use std::process::{Command, Output};
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use readlog::application::{ServerConfig, serve};
use readlog::domain::repositories::UserRepository;
use readlog::domain::users::NewUser;
use readlog::infrastructure::auth::hash_password;
use readlog::infrastructure::database::Database;
use readlog::infrastructure::repositories::users::SqlUserRepository;
use serde_json::Value;
use tempfile::TempDir;

pub const CLI_USERNAME: &str = "cli-reader";
pub const CLI_PASSWORD: &str = "cli password 123";

/// One server per test binary, running on a background thread over a
/// temporary SQLite file.
pub struct TestServer {
    pub url: String,
    pub token: String,
    _dir: TempDir,
}

static SERVER: Lazy<TestServer> = Lazy::new(start_server);

pub fn server() -> &'static TestServer {
    &SERVER
}

fn start_server() -> TestServer {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let database_url = format!("sqlite://{}", dir.path().join("readlog.db").display());
    let port = portpicker::pick_unused_port().expect("No free port available");
    let dead_port = portpicker::pick_unused_port().expect("No free port available");
    let bind_address: SocketAddr = format!("127.0.0.1:{port}").parse().expect("valid address");

    let config = ServerConfig {
        bind_address,
        database_url: database_url.clone(),
        insecure_cookies: true,
        // Nothing listens here, so cover lookups fail fast and books keep no cover.
        cover_lookup_url: format!("http://127.0.0.1:{dead_port}"),
        mail_webhook_url: None,
        verification_ttl: Duration::from_secs(900),
        session_ttl: chrono::Duration::hours(1),
    };

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("Failed to build runtime");
        runtime.block_on(async move {
            seed_user(&database_url).await;
            serve(config).await.expect("server failed");
        });
    });

    wait_for_port(bind_address);

    let url = format!("http://{bind_address}");
    let output = run_readlog_at(
        &url,
        &["login", "--username", CLI_USERNAME],
        &[("READLOG_PASSWORD", CLI_PASSWORD)],
    );
    assert!(
        output.status.success(),
        "login should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let response = parse_json(&output);
    let token = response["token"]
        .as_str()
        .expect("login output should contain a token")
        .to_string();

    TestServer {
        url,
        token,
        _dir: dir,
    }
}

async fn seed_user(database_url: &str) {
    let database = Database::connect(database_url)
        .await
        .expect("Failed to open database");
    database.migrate().await.expect("Failed to migrate");
    let users = SqlUserRepository::new(database.clone_pool());
    let hash = hash_password(CLI_PASSWORD).expect("Failed to hash password");
    users
        .insert(NewUser::new(
            CLI_USERNAME.to_string(),
            "cli@example.com".to_string(),
            hash,
        ))
        .await
        .expect("Failed to seed user");
    database.close().await;
}

fn wait_for_port(address: SocketAddr) {
    let deadline = Instant::now() + Duration::from_secs(30);
    while TcpStream::connect(address).is_err() {
        assert!(Instant::now() < deadline, "server did not start on {address}");
        std::thread::sleep(Duration::from_millis(50));
    }
}

fn run_readlog_at(url: &str, args: &[&str], envs: &[(&str, &str)]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_readlog"))
        .args(args)
        .env("READLOG_URL", url)
        .env_remove("READLOG_TOKEN")
        .env("RUST_LOG", "warn")
        .envs(envs.iter().copied())
        .output()
        .expect("Failed to run readlog binary")
}

/// Run the CLI against the shared server.
pub fn run_readlog(args: &[&str], envs: &[(&str, &str)]) -> Output {
    run_readlog_at(&server().url, args, envs)
}

/// Run the CLI with the shared session token.
pub fn run_authenticated(args: &[&str]) -> Output {
    let token = server().token.clone();
    run_readlog(args, &[("READLOG_TOKEN", token.as_str())])
}

pub fn parse_json(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("Should output valid JSON ({e}): {stdout}"))
}

pub fn assert_success(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{what} should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Add a book and return its id.
pub fn add_book(title: &str, author: &str, extra: &[&str]) -> i64 {
    let mut args = vec!["book", "add", "--title", title, "--author", author];
    args.extend_from_slice(extra);
    let output = run_authenticated(&args);
    assert_success(&output, "book add");
    parse_json(&output)["id"]
        .as_i64()
        .expect("Should have an ID")
}
