mod accounts;
mod books;
pub mod dashboard;
mod profile;

pub use accounts::{AccountService, INVALID_CREDENTIALS, MIN_PASSWORD_LENGTH};
pub use books::BookService;
pub use profile::ProfileService;
