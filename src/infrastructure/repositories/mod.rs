pub mod avatars;
pub mod books;
pub mod favorites;
pub(crate) mod macros;
pub mod sessions;
pub mod users;
