pub mod analytics;
pub mod auth;
pub mod books;
pub mod errors;
pub mod formatting;
pub mod ids;
pub mod repositories;

// Re-exports
pub use analytics::dashboard;
pub use auth::{sessions, users, verification};
pub use books::books as book_items;
pub use books::favorites;
pub use errors::RepositoryError;
