use async_trait::async_trait;

use crate::errors::AppError;

/// Remote object-storage and transformation boundary. Owns the original
/// image bytes; derived assets are addressed with URL-based transform
/// directives, so `transformed_url` is pure URL construction with no
/// network call.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, file_name: &str) -> Result<UploadedMedia, AppError>;
    fn transformed_url(&self, content_id: &str, directives: &[String]) -> String;
    async fn release(&self, content_id: &str) -> Result<(), AppError>;
}

#[derive(Debug, Clone)]
pub struct UploadedMedia {
    pub content_id: String,
    pub url: String,
    pub width: i32,
    pub height: i32,
}
