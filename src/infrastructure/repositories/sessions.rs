use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as};

use crate::domain::RepositoryError;
use crate::domain::ids::{SessionId, UserId};
use crate::domain::repositories::SessionRepository;
use crate::domain::sessions::{NewSession, Session};
use crate::infrastructure::database::DatabasePool;

#[derive(Clone)]
pub struct SqlSessionRepository {
    pool: DatabasePool,
}

impl SqlSessionRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRecord {
    id: i64,
    user_id: i64,
    token_hash: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        Self {
            id: SessionId::from(record.id),
            user_id: UserId::from(record.user_id),
            token_hash: record.token_hash,
            created_at: record.created_at,
            expires_at: record.expires_at,
        }
    }
}

#[async_trait]
impl SessionRepository for SqlSessionRepository {
    async fn insert(&self, session: NewSession) -> Result<Session, RepositoryError> {
        let record = query_as::<_, SessionRecord>(
            r"INSERT INTO sessions (user_id, token_hash, created_at, expires_at)
              VALUES (?, ?, ?, ?)
              RETURNING id, user_id, token_hash, created_at, expires_at",
        )
        .bind(i64::from(session.user_id))
        .bind(&session.token_hash)
        .bind(Utc::now())
        .bind(session.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(record.into())
    }

    async fn get_by_token_hash(&self, token_hash: &str) -> Result<Session, RepositoryError> {
        let record = query_as::<_, SessionRecord>(
            "SELECT id, user_id, token_hash, created_at, expires_at FROM sessions WHERE token_hash = ?",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(record.into())
    }

    async fn delete(&self, id: SessionId) -> Result<(), RepositoryError> {
        query("DELETE FROM sessions WHERE id = ?")
            .bind(i64::from(id))
            .execute(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;
        Ok(result.rows_affected())
    }
}
