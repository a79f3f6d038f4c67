pub mod image;
pub mod token;
pub mod transform;
pub mod user;
