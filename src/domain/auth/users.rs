use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::UserId;

/// A registered account. The password hash never leaves the persistence
/// layer except for verification, so it is skipped when serializing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            username: username.trim().to_string(),
            email: normalize_email(&email),
            password_hash,
        }
    }
}

/// Public view of a user's profile, as returned by the profile endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub has_avatar: bool,
    pub avatar_url: Option<String>,
}

impl ProfileSummary {
    pub fn new(user: &User, has_avatar: bool) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            bio: user.bio.clone(),
            has_avatar,
            avatar_url: has_avatar.then(|| format!("/api/v1/users/{}/avatar", user.id)),
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
