use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar};

use crate::domain::RepositoryError;
use crate::domain::ids::UserId;
use crate::domain::repositories::{Avatar, AvatarRepository};
use crate::infrastructure::database::DatabasePool;

#[derive(Clone)]
pub struct SqlAvatarRepository {
    pool: DatabasePool,
}

impl SqlAvatarRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AvatarRecord {
    user_id: i64,
    content_type: String,
    image_data: Vec<u8>,
}

#[async_trait]
impl AvatarRepository for SqlAvatarRepository {
    async fn upsert(&self, avatar: Avatar) -> Result<(), RepositoryError> {
        query(
            r"INSERT INTO user_avatars (user_id, content_type, image_data)
               VALUES (?, ?, ?)
               ON CONFLICT (user_id)
               DO UPDATE SET content_type = excluded.content_type,
                             image_data = excluded.image_data,
                             updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')",
        )
        .bind(i64::from(avatar.user_id))
        .bind(&avatar.content_type)
        .bind(&avatar.data)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::unexpected(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, user_id: UserId) -> Result<Avatar, RepositoryError> {
        let record = query_as::<_, AvatarRecord>(
            "SELECT user_id, content_type, image_data FROM user_avatars WHERE user_id = ?",
        )
        .bind(i64::from(user_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::unexpected(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(Avatar {
            user_id: UserId::from(record.user_id),
            content_type: record.content_type,
            data: record.image_data,
        })
    }

    async fn exists(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM user_avatars WHERE user_id = ?)")
            .bind(i64::from(user_id))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::unexpected(e.to_string()))
    }
}
