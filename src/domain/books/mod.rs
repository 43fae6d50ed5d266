pub mod books;
pub mod favorites;
