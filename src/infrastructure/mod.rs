pub mod auth;
pub mod client;
pub mod cover_lookup;
pub mod database;
pub mod image_processing;
pub mod mailer;
pub mod repositories;
pub mod verification;
