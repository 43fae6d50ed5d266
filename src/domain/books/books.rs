use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::ids::{BookId, UserId};

/// A logged book entry. Always owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub user_id: UserId,
    pub title: String,
    pub author: String,
    pub rating: Option<f64>,
    pub notes: Option<String>,
    /// Absent for unread or in-progress entries.
    pub date_read: Option<NaiveDate>,
    /// Comma-separated labels, stored exactly as entered.
    pub tags: Option<String>,
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Year of `date_read`, if the book has been read.
    pub fn year_read(&self) -> Option<i32> {
        self.date_read.map(|d| d.year())
    }

    pub fn was_read_in(&self, year: i32) -> bool {
        self.year_read() == Some(year)
    }

    /// Normalized tag tokens in the order they were entered.
    pub fn tag_tokens(&self) -> impl Iterator<Item = String> + '_ {
        self.tags.as_deref().into_iter().flat_map(split_tags)
    }
}

/// Split a raw tag field on commas, trimming and lower-casing each token and
/// dropping empty ones. Stray commas or whitespace-only input yield nothing.
pub fn split_tags(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
}

/// Fields supplied when logging a book. Ownership comes from the session,
/// never from the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub date_read: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
}

impl NewBook {
    pub fn normalize(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.author = self.author.trim().to_string();
        self.notes = normalize_optional_field(self.notes);
        self.tags = normalize_optional_field(self.tags);
        self.cover_url = normalize_optional_field(self.cover_url);
        self
    }
}

/// Partial update. For nullable columns, `None` = don't change,
/// `Some(None)` = clear, `Some(Some(v))` = set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateBook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub rating: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_read: Option<Option<NaiveDate>>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub tags: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub cover_url: Option<Option<String>>,
}

impl UpdateBook {
    pub fn normalize(mut self) -> Self {
        self.title = self.title.map(|t| t.trim().to_string());
        self.author = self.author.map(|a| a.trim().to_string());
        self.notes = self.notes.map(normalize_optional_field);
        self.tags = self.tags.map(normalize_optional_field);
        self.cover_url = self.cover_url.map(normalize_optional_field);
        self
    }

    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.author.is_some()
            || self.rating.is_some()
            || self.notes.is_some()
            || self.date_read.is_some()
            || self.tags.is_some()
            || self.cover_url.is_some()
    }

    /// Merge the changes into an existing book.
    pub fn apply_to(self, mut book: Book) -> Book {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(author) = self.author {
            book.author = author;
        }
        if let Some(rating) = self.rating {
            book.rating = rating;
        }
        if let Some(notes) = self.notes {
            book.notes = notes;
        }
        if let Some(date_read) = self.date_read {
            book.date_read = date_read;
        }
        if let Some(tags) = self.tags {
            book.tags = tags;
        }
        if let Some(cover_url) = self.cover_url {
            book.cover_url = cover_url;
        }
        book
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field (`None`).
fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub(crate) fn normalize_optional_field(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
