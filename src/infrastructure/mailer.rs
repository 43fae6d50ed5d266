use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
#[error("mail delivery failed: {0}")]
pub struct MailError(String);

/// An outgoing verification email.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationEmail {
    pub to: String,
    pub username: String,
    pub subject: String,
    pub body: String,
}

impl VerificationEmail {
    pub fn new(to: &str, username: &str, code: &str) -> Self {
        Self {
            to: to.to_string(),
            username: username.to_string(),
            subject: "Your readlog verification code".to_string(),
            body: format!("Hi {username},\n\nYour verification code is {code}.\n"),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &VerificationEmail) -> Result<(), MailError>;
}

/// Writes emails to the log instead of sending them.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &VerificationEmail) -> Result<(), MailError> {
        info!(to = %email.to, subject = %email.subject, body = %email.body, "verification email");
        Ok(())
    }
}

/// Posts each email as JSON to an HTTP endpoint that handles delivery.
pub struct WebhookMailer {
    client: reqwest::Client,
    url: String,
}

impl WebhookMailer {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    async fn send(&self, email: &VerificationEmail) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.url)
            .json(email)
            .send()
            .await
            .map_err(|err| MailError(err.to_string()))?;

        if !response.status().is_success() {
            return Err(MailError(format!("webhook returned {}", response.status())));
        }
        Ok(())
    }
}
