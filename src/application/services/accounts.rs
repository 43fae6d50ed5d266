use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::application::errors::AppError;
use crate::domain::RepositoryError;
use crate::domain::ids::UserId;
use crate::domain::repositories::{SessionRepository, UserRepository};
use crate::domain::sessions::{LoginResponse, NewSession};
use crate::domain::users::{NewUser, User, normalize_email};
use crate::domain::verification::{PendingRegistration, VerificationFailure};
use crate::infrastructure::auth::{
    PLACEHOLDER_PASSWORD_HASH, generate_session_token, hash_password, hash_token,
    verify_password,
};
use crate::infrastructure::mailer::{Mailer, VerificationEmail};
use crate::infrastructure::verification::VerificationCodeStore;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const INVALID_CREDENTIALS: &str = "invalid username or password";

/// Registration, verification, sessions and account removal.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    codes: VerificationCodeStore,
    mailer: Arc<dyn Mailer>,
    session_ttl: Duration,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        codes: VerificationCodeStore,
        mailer: Arc<dyn Mailer>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            codes,
            mailer,
            session_ttl,
        }
    }

    /// Park a registration behind an emailed code. Returns the normalized
    /// email the code was sent to.
    pub async fn start_registration(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<String, AppError> {
        let username = username.trim();
        let email = normalize_email(email);

        if username.is_empty() {
            return Err(AppError::validation("username is required"));
        }
        if !email.contains('@') {
            return Err(AppError::validation("a valid email address is required"));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::validation(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        if self.users.exists(username, &email).await? {
            return Err(AppError::Conflict(
                "username or email already registered".to_string(),
            ));
        }

        let password_hash = hash_password(password)
            .map_err(|err| AppError::unexpected(format!("failed to hash password: {err}")))?;

        let code = self.codes.issue(PendingRegistration {
            username: username.to_string(),
            email: email.clone(),
            password_hash,
        });

        self.mailer
            .send(&VerificationEmail::new(&email, username, &code))
            .await
            .map_err(|err| {
                warn!(error = %err, "failed to deliver verification code");
                AppError::unexpected(err.to_string())
            })?;

        info!(%username, "verification code issued");
        Ok(email)
    }

    /// Redeem a verification code and create the account it was issued for.
    pub async fn verify_registration(&self, email: &str, code: &str) -> Result<User, AppError> {
        let pending = self.codes.verify(email, code).map_err(|failure| {
            let message = match failure {
                VerificationFailure::Missing => "verification code expired, register again",
                VerificationFailure::Mismatch => "invalid verification code",
            };
            AppError::validation(message)
        })?;

        let user = self
            .users
            .insert(NewUser::new(
                pending.username,
                pending.email,
                pending.password_hash,
            ))
            .await?;

        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Check credentials and open a session. Unknown users and wrong
    /// passwords are indistinguishable to the caller.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AppError> {
        let user = match self.users.get_by_username(username.trim()).await {
            Ok(user) => user,
            Err(RepositoryError::NotFound) => {
                verify_password(password, PLACEHOLDER_PASSWORD_HASH);
                return Err(AppError::Unauthorized);
            }
            Err(err) => return Err(err.into()),
        };

        if !verify_password(password, &user.password_hash) {
            warn!(user_id = %user.id, "failed login attempt");
            return Err(AppError::Unauthorized);
        }

        let token = generate_session_token();
        let expires_at = Utc::now()
            .checked_add_signed(self.session_ttl)
            .ok_or_else(|| AppError::unexpected("session expiry overflow"))?;

        let session = self
            .sessions
            .insert(NewSession {
                user_id: user.id,
                token_hash: hash_token(&token),
                expires_at,
            })
            .await?;

        info!(user_id = %user.id, session_id = %session.id, "user logged in");
        Ok(LoginResponse {
            token,
            expires_at: session.expires_at,
            user,
        })
    }

    /// End the session behind `token`. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        match self.sessions.get_by_token_hash(&hash_token(token)).await {
            Ok(session) => {
                self.sessions.delete(session.id).await?;
                info!(user_id = %session.user_id, "user logged out");
                Ok(())
            }
            Err(RepositoryError::NotFound) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Remove the user; books, sessions, favorites and avatar cascade.
    pub async fn delete_account(&self, user_id: UserId) -> Result<(), AppError> {
        self.users.delete(user_id).await?;
        info!(%user_id, "account deleted");
        Ok(())
    }
}
