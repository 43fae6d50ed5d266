pub mod sessions;
pub mod users;
pub mod verification;
