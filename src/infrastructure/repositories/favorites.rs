use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar};

use crate::domain::RepositoryError;
use crate::domain::book_items::Book;
use crate::domain::ids::{BookId, UserId};
use crate::domain::repositories::FavoriteRepository;
use crate::infrastructure::database::DatabasePool;
use crate::infrastructure::repositories::books::BookRecord;

#[derive(Clone)]
pub struct SqlFavoriteRepository {
    pool: DatabasePool,
}

impl SqlFavoriteRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteRepository for SqlFavoriteRepository {
    async fn list(&self, user_id: UserId) -> Result<Vec<Book>, RepositoryError> {
        let records = query_as::<_, BookRecord>(
            r"SELECT b.id, b.user_id, b.title, b.author, b.rating, b.notes, b.date_read, b.tags, b.cover_url, b.created_at
              FROM favorite_books f
              JOIN books b ON b.id = f.book_id
              WHERE f.user_id = ?
              ORDER BY f.position ASC",
        )
        .bind(i64::from(user_id))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(records.into_iter().map(Book::from).collect())
    }

    async fn replace(&self, user_id: UserId, book_ids: &[BookId]) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        query("DELETE FROM favorite_books WHERE user_id = ?")
            .bind(i64::from(user_id))
            .execute(&mut *tx)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        for (position, book_id) in (0_i64..).zip(book_ids) {
            let owned = query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM books WHERE id = ? AND user_id = ?)",
            )
            .bind(i64::from(*book_id))
            .bind(i64::from(user_id))
            .fetch_one(&mut *tx)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

            // Dropping `tx` rolls the delete back.
            if !owned {
                return Err(RepositoryError::NotFound);
            }

            query("INSERT INTO favorite_books (user_id, book_id, position) VALUES (?, ?, ?)")
                .bind(i64::from(user_id))
                .bind(i64::from(*book_id))
                .bind(position)
                .execute(&mut *tx)
                .await
                .map_err(|err| RepositoryError::unexpected(err.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(())
    }
}
