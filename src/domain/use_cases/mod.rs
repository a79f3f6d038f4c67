pub mod auth;
pub mod dispatch;
pub mod extractors;
pub mod images;
