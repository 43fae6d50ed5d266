use std::sync::Arc;

use tracing::{debug, info};

use crate::application::errors::AppError;
use crate::domain::book_items::{Book, NewBook, UpdateBook};
use crate::domain::formatting::is_valid_rating;
use crate::domain::ids::{BookId, UserId};
use crate::domain::repositories::BookRepository;
use crate::infrastructure::cover_lookup::CoverLookup;

#[derive(Clone)]
pub struct BookService {
    books: Arc<dyn BookRepository>,
    covers: CoverLookup,
}

impl BookService {
    pub fn new(books: Arc<dyn BookRepository>, covers: CoverLookup) -> Self {
        Self { books, covers }
    }

    /// Validate and store a new book. Books logged without cover art get one
    /// from the cover lookup when it has a match.
    pub async fn create(&self, user_id: UserId, new: NewBook) -> Result<Book, AppError> {
        let mut new = new.normalize();
        validate_required("title", &new.title)?;
        validate_required("author", &new.author)?;
        validate_rating(new.rating)?;

        if new.cover_url.is_none() {
            new.cover_url = self.covers.find_cover(&new.title, &new.author).await;
            if new.cover_url.is_some() {
                debug!(title = %new.title, "cover found by lookup");
            }
        }

        let book = self.books.insert(user_id, new).await?;
        info!(book_id = %book.id, %user_id, title = %book.title, "book created");
        Ok(book)
    }

    pub async fn update(
        &self,
        user_id: UserId,
        id: BookId,
        changes: UpdateBook,
    ) -> Result<Book, AppError> {
        let changes = changes.normalize();
        if !changes.has_changes() {
            return Err(AppError::validation("no changes provided"));
        }
        if let Some(title) = &changes.title {
            validate_required("title", title)?;
        }
        if let Some(author) = &changes.author {
            validate_required("author", author)?;
        }
        if let Some(rating) = changes.rating {
            validate_rating(rating)?;
        }

        let book = self.books.update(user_id, id, changes).await?;
        info!(book_id = %book.id, %user_id, "book updated");
        Ok(book)
    }

    pub async fn delete(&self, user_id: UserId, id: BookId) -> Result<(), AppError> {
        self.books.delete(user_id, id).await?;
        info!(book_id = %id, %user_id, "book deleted");
        Ok(())
    }
}

fn validate_required(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(())
}

fn validate_rating(rating: Option<f64>) -> Result<(), AppError> {
    match rating {
        Some(value) if !is_valid_rating(value) => Err(AppError::validation(
            "rating must be a number between 0 and 5",
        )),
        _ => Ok(()),
    }
}
