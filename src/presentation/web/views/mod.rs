mod books;
mod dashboard;

pub use books::{BookFormView, BookView, FavoriteOptionView};
pub use dashboard::{DashboardView, MonthBarView, YearOptionView};

use std::fmt::Display;

use crate::domain::formatting::SENTINEL;
use crate::domain::ids::BookId;

pub(crate) fn or_sentinel<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| SENTINEL.to_string(), |v| v.to_string())
}

pub(crate) fn book_edit_path(id: BookId) -> String {
    format!("/books/{id}/edit")
}

pub(crate) fn book_delete_path(id: BookId) -> String {
    format!("/books/{id}/delete")
}
