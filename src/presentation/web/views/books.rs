use std::collections::HashSet;

use crate::domain::book_items::Book;
use crate::domain::formatting::format_rating;
use crate::domain::ids::BookId;

use super::{book_delete_path, book_edit_path, or_sentinel};

/// A book as shown in lists and on the profile page.
pub struct BookView {
    pub id: String,
    pub title: String,
    pub author: String,
    pub rating: String,
    pub date_read: String,
    pub tags: Vec<String>,
    pub notes: String,
    pub cover_url: Option<String>,
    pub edit_path: String,
    pub delete_path: String,
}

impl From<Book> for BookView {
    fn from(book: Book) -> Self {
        let tags = book.tag_tokens().collect();
        Self {
            id: book.id.to_string(),
            rating: or_sentinel(book.rating.map(format_rating)),
            date_read: or_sentinel(book.date_read.map(|d| d.format("%Y-%m-%d"))),
            tags,
            notes: book.notes.unwrap_or_default(),
            edit_path: book_edit_path(book.id),
            delete_path: book_delete_path(book.id),
            title: book.title,
            author: book.author,
            cover_url: book.cover_url,
        }
    }
}

/// Checkbox entry in the favorites picker.
pub struct FavoriteOptionView {
    pub id: String,
    pub label: String,
    pub checked: bool,
}

impl FavoriteOptionView {
    pub fn from_books(books: &[Book], favorites: &HashSet<BookId>) -> Vec<Self> {
        books
            .iter()
            .map(|book| Self {
                id: book.id.to_string(),
                label: format!("{} by {}", book.title, book.author),
                checked: favorites.contains(&book.id),
            })
            .collect()
    }
}

/// Values and labels for the add/edit book form. Fields hold raw strings so
/// a rejected submission can be shown again as typed.
#[derive(Default)]
pub struct BookFormView {
    pub heading: &'static str,
    pub action: String,
    pub submit_label: &'static str,
    pub title: String,
    pub author: String,
    pub rating: String,
    pub date_read: String,
    pub tags: String,
    pub notes: String,
    pub cover_url: String,
    pub error: Option<String>,
}

impl BookFormView {
    pub fn new_book() -> Self {
        Self {
            heading: "Add a book",
            action: "/books".to_string(),
            submit_label: "Add book",
            ..Self::default()
        }
    }

    pub fn edit(book: &Book) -> Self {
        Self {
            heading: "Edit book",
            action: book_edit_path(book.id),
            submit_label: "Save changes",
            title: book.title.clone(),
            author: book.author.clone(),
            rating: book.rating.map(|r| r.to_string()).unwrap_or_default(),
            date_read: book
                .date_read
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            tags: book.tags.clone().unwrap_or_default(),
            notes: book.notes.clone().unwrap_or_default(),
            cover_url: book.cover_url.clone().unwrap_or_default(),
            error: None,
        }
    }

    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
