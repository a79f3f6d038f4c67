pub mod cache;
pub mod image;
pub mod media;
pub mod sqlx_repo;
pub mod token;
pub mod user;
