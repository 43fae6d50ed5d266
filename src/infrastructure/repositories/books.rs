use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{QueryBuilder, query, query_as};

use crate::domain::RepositoryError;
use crate::domain::book_items::{Book, NewBook, UpdateBook};
use crate::domain::ids::{BookId, UserId};
use crate::domain::repositories::BookRepository;
use crate::infrastructure::database::DatabasePool;
use crate::infrastructure::repositories::macros::push_update_field;

const BOOK_COLUMNS: &str =
    "id, user_id, title, author, rating, notes, date_read, tags, cover_url, created_at";

/// Lower-cased title and author, compared against a lower-cased search term.
/// SQLite's `LOWER()` only folds ASCII, so the folding happens here instead.
fn search_key(title: &str, author: &str) -> String {
    format!("{}\u{1f}{}", title.to_lowercase(), author.to_lowercase())
}

#[derive(Clone)]
pub struct SqlBookRepository {
    pool: DatabasePool,
}

impl SqlBookRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct BookRecord {
    id: i64,
    user_id: i64,
    title: String,
    author: String,
    rating: Option<f64>,
    notes: Option<String>,
    date_read: Option<NaiveDate>,
    tags: Option<String>,
    cover_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<BookRecord> for Book {
    fn from(record: BookRecord) -> Self {
        Book {
            id: BookId::from(record.id),
            user_id: UserId::from(record.user_id),
            title: record.title,
            author: record.author,
            rating: record.rating,
            notes: record.notes,
            date_read: record.date_read,
            tags: record.tags,
            cover_url: record.cover_url,
            created_at: record.created_at,
        }
    }
}

#[async_trait]
impl BookRepository for SqlBookRepository {
    async fn insert(
        &self,
        user_id: UserId,
        new_book: NewBook,
    ) -> Result<Book, RepositoryError> {
        let record = query_as::<_, BookRecord>(&format!(
            r"INSERT INTO books (user_id, title, author, rating, notes, date_read, tags, cover_url, search_key, created_at)
              VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
              RETURNING {BOOK_COLUMNS}"
        ))
        .bind(i64::from(user_id))
        .bind(&new_book.title)
        .bind(&new_book.author)
        .bind(new_book.rating)
        .bind(new_book.notes.as_deref())
        .bind(new_book.date_read)
        .bind(new_book.tags.as_deref())
        .bind(new_book.cover_url.as_deref())
        .bind(search_key(&new_book.title, &new_book.author))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if err.to_string().contains("FOREIGN KEY constraint failed") {
                return RepositoryError::NotFound;
            }
            RepositoryError::unexpected(err.to_string())
        })?;

        Ok(record.into())
    }

    async fn get(&self, user_id: UserId, id: BookId) -> Result<Book, RepositoryError> {
        let record = query_as::<_, BookRecord>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = ? AND user_id = ?"
        ))
        .bind(i64::from(id))
        .bind(i64::from(user_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(record.into())
    }

    async fn search(
        &self,
        user_id: UserId,
        search: Option<&str>,
    ) -> Result<Vec<Book>, RepositoryError> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE user_id = "
        ));
        builder.push_bind(i64::from(user_id));

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term.to_lowercase());
            builder.push(" AND search_key LIKE ");
            builder.push_bind(pattern);
        }
        builder.push(" ORDER BY created_at DESC, id DESC");

        let records = builder
            .build_query_as::<BookRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(records.into_iter().map(Book::from).collect())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Book>, RepositoryError> {
        let records = query_as::<_, BookRecord>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE user_id = ? ORDER BY id ASC"
        ))
        .bind(i64::from(user_id))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(records.into_iter().map(Book::from).collect())
    }

    async fn update(
        &self,
        user_id: UserId,
        id: BookId,
        changes: UpdateBook,
    ) -> Result<Book, RepositoryError> {
        if !changes.has_changes() {
            return self.get(user_id, id).await;
        }

        let renamed = if changes.title.is_some() || changes.author.is_some() {
            let current = self.get(user_id, id).await?;
            Some(search_key(
                changes.title.as_deref().unwrap_or(&current.title),
                changes.author.as_deref().unwrap_or(&current.author),
            ))
        } else {
            None
        };

        let mut builder = QueryBuilder::new("UPDATE books SET ");
        let mut sep = false;

        push_update_field!(builder, sep, "title", changes.title);
        push_update_field!(builder, sep, "author", changes.author);
        push_update_field!(builder, sep, "rating", changes.rating);
        push_update_field!(builder, sep, "notes", changes.notes);
        push_update_field!(builder, sep, "date_read", changes.date_read);
        push_update_field!(builder, sep, "tags", changes.tags);
        push_update_field!(builder, sep, "cover_url", changes.cover_url);
        push_update_field!(builder, sep, "search_key", renamed);

        builder.push(" WHERE id = ");
        builder.push_bind(i64::from(id));
        builder.push(" AND user_id = ");
        builder.push_bind(i64::from(user_id));

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(user_id, id).await
    }

    async fn delete(&self, user_id: UserId, id: BookId) -> Result<(), RepositoryError> {
        let result = query("DELETE FROM books WHERE id = ? AND user_id = ?")
            .bind(i64::from(id))
            .bind(i64::from(user_id))
            .execute(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
