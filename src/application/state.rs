use std::sync::Arc;
use std::time::Duration;

use crate::application::rate_limit::RateLimitLayer;
use crate::application::services::{AccountService, BookService, ProfileService};
use crate::domain::repositories::{
    AvatarRepository, BookRepository, FavoriteRepository, SessionRepository, UserRepository,
};
use crate::infrastructure::cover_lookup::CoverLookup;
use crate::infrastructure::database::Database;
use crate::infrastructure::mailer::{LogMailer, Mailer, WebhookMailer};
use crate::infrastructure::repositories::avatars::SqlAvatarRepository;
use crate::infrastructure::repositories::books::SqlBookRepository;
use crate::infrastructure::repositories::favorites::SqlFavoriteRepository;
use crate::infrastructure::repositories::sessions::SqlSessionRepository;
use crate::infrastructure::repositories::users::SqlUserRepository;
use crate::infrastructure::verification::VerificationCodeStore;

/// Maximum auth requests per IP per minute.
const AUTH_RATE_LIMIT_PER_MINUTE: u32 = 10;

/// Everything that varies between production and test environments. Repos
/// and services are created from the database pool.
pub struct AppStateConfig {
    pub insecure_cookies: bool,
    pub cover_lookup_url: String,
    /// Deliver verification emails to this endpoint; `None` logs them instead.
    pub mail_webhook_url: Option<String>,
    pub verification_ttl: Duration,
    pub session_ttl: chrono::Duration,
}

#[derive(Clone)]
pub struct AppState {
    pub book_repo: Arc<dyn BookRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub session_repo: Arc<dyn SessionRepository>,
    pub favorite_repo: Arc<dyn FavoriteRepository>,
    pub avatar_repo: Arc<dyn AvatarRepository>,
    pub book_service: BookService,
    pub account_service: AccountService,
    pub profile_service: ProfileService,
    pub verification_store: VerificationCodeStore,
    pub insecure_cookies: bool,
    pub auth_rate_limit: RateLimitLayer,
}

impl AppState {
    /// Build the full application state from a database connection and config.
    pub fn from_database(database: &Database, config: AppStateConfig) -> Self {
        let pool = database.clone_pool();

        let book_repo: Arc<dyn BookRepository> = Arc::new(SqlBookRepository::new(pool.clone()));
        let user_repo: Arc<dyn UserRepository> = Arc::new(SqlUserRepository::new(pool.clone()));
        let session_repo: Arc<dyn SessionRepository> =
            Arc::new(SqlSessionRepository::new(pool.clone()));
        let favorite_repo: Arc<dyn FavoriteRepository> =
            Arc::new(SqlFavoriteRepository::new(pool.clone()));
        let avatar_repo: Arc<dyn AvatarRepository> = Arc::new(SqlAvatarRepository::new(pool));

        #[allow(clippy::expect_used)]
        let http_client = reqwest::ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        let mailer: Arc<dyn Mailer> = match config.mail_webhook_url {
            Some(url) => Arc::new(WebhookMailer::new(http_client.clone(), url)),
            None => Arc::new(LogMailer),
        };

        let verification_store = VerificationCodeStore::new(config.verification_ttl);
        let covers = CoverLookup::new(http_client, config.cover_lookup_url);

        let book_service = BookService::new(Arc::clone(&book_repo), covers);
        let account_service = AccountService::new(
            Arc::clone(&user_repo),
            Arc::clone(&session_repo),
            verification_store.clone(),
            mailer,
            config.session_ttl,
        );

        let profile_service = ProfileService::new(
            Arc::clone(&user_repo),
            Arc::clone(&avatar_repo),
            Arc::clone(&favorite_repo),
        );

        Self {
            book_repo,
            user_repo,
            session_repo,
            favorite_repo,
            avatar_repo,
            book_service,
            account_service,
            profile_service,
            verification_store,
            insecure_cookies: config.insecure_cookies,
            auth_rate_limit: RateLimitLayer::per_minute(AUTH_RATE_LIMIT_PER_MINUTE),
        }
    }
}
