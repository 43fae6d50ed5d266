use chrono::{DateTime, Utc};

use super::RepositoryError;
use crate::domain::book_items::{Book, NewBook, UpdateBook};
use crate::domain::ids::{BookId, SessionId, UserId};
use crate::domain::sessions::{NewSession, Session};
use crate::domain::users::{NewUser, User};
use async_trait::async_trait;

/// Book storage. Every operation is scoped to the owning user; a book that
/// belongs to someone else is reported as [`RepositoryError::NotFound`].
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn insert(&self, user_id: UserId, book: NewBook) -> Result<Book, RepositoryError>;
    async fn get(&self, user_id: UserId, id: BookId) -> Result<Book, RepositoryError>;
    /// Newest first, optionally filtered by a case-insensitive substring of
    /// title or author.
    async fn search(
        &self,
        user_id: UserId,
        search: Option<&str>,
    ) -> Result<Vec<Book>, RepositoryError>;
    /// Every record the user owns, in insertion (id) order.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Book>, RepositoryError>;
    async fn update(
        &self,
        user_id: UserId,
        id: BookId,
        changes: UpdateBook,
    ) -> Result<Book, RepositoryError>;
    async fn delete(&self, user_id: UserId, id: BookId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError>;
    async fn get(&self, id: UserId) -> Result<User, RepositoryError>;
    async fn get_by_username(&self, username: &str) -> Result<User, RepositoryError>;
    /// Whether either the username or the email is already registered.
    async fn exists(&self, username: &str, email: &str) -> Result<bool, RepositoryError>;
    async fn update_bio(&self, id: UserId, bio: Option<String>) -> Result<User, RepositoryError>;
    async fn delete(&self, id: UserId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert(&self, session: NewSession) -> Result<Session, RepositoryError>;
    async fn get_by_token_hash(&self, token_hash: &str) -> Result<Session, RepositoryError>;
    async fn delete(&self, id: SessionId) -> Result<(), RepositoryError>;
    /// Remove sessions that expired before `now`; returns how many were removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError>;
}

#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Favorites in the order they were chosen.
    async fn list(&self, user_id: UserId) -> Result<Vec<Book>, RepositoryError>;
    /// Replace the whole favorite set. Ids must belong to `user_id`.
    async fn replace(&self, user_id: UserId, book_ids: &[BookId]) -> Result<(), RepositoryError>;
}

/// A stored profile picture.
#[derive(Debug, Clone)]
pub struct Avatar {
    pub user_id: UserId,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[async_trait]
pub trait AvatarRepository: Send + Sync {
    async fn upsert(&self, avatar: Avatar) -> Result<(), RepositoryError>;
    async fn get(&self, user_id: UserId) -> Result<Avatar, RepositoryError>;
    async fn exists(&self, user_id: UserId) -> Result<bool, RepositoryError>;
}
