use actix_multipart::form::{bytes::Bytes as MultipartBytes, MultipartForm};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A stored image record. Owned by exactly one user; every lookup is
/// filtered by `(id, user_id)` so records are never visible cross-user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Image {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content_id: String,
    pub url: String,
    pub original_name: String,
    pub file_size: i64,
    pub format: String,
    pub width: i32,
    pub height: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Image {
    pub fn metadata(&self) -> ImageMetadata {
        ImageMetadata {
            original_name: self.original_name.clone(),
            size: self.file_size,
            format: self.format.clone(),
            width: self.width,
            height: self.height,
            description: self.description.clone(),
        }
    }
}

#[derive(Debug)]
pub struct ImageInsert {
    pub user_id: Uuid,
    pub content_id: String,
    pub url: String,
    pub original_name: String,
    pub file_size: i64,
    pub format: String,
    pub width: i32,
    pub height: i32,
}

// The byte cap comes from `max_upload_bytes`, enforced by the handler and
// by the MultipartFormConfig installed at server wiring.
#[derive(Debug, MultipartForm)]
pub struct ImageUpload {
    #[multipart(rename = "image")]
    pub image: MultipartBytes,
}

#[derive(Debug, Serialize)]
pub struct ImageMetadata {
    pub original_name: String,
    pub size: i64,
    pub format: String,
    pub width: i32,
    pub height: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub id: Uuid,
    pub url: String,
    pub metadata: ImageMetadata,
}

impl From<Image> for ImageResponse {
    fn from(image: Image) -> Self {
        ImageResponse {
            id: image.id,
            url: image.url.clone(),
            metadata: image.metadata(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImageSummary {
    pub id: Uuid,
    pub url: String,
    pub metadata: ImageMetadata,
    pub created_at: DateTime<Utc>,
}

impl From<Image> for ImageSummary {
    fn from(image: Image) -> Self {
        ImageSummary {
            id: image.id,
            url: image.url.clone(),
            metadata: image.metadata(),
            created_at: image.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct ImageListResponse {
    pub data: Vec<ImageSummary>,
    pub pagination: Pagination,
}

/// Partial metadata merge: provided fields fully replace their current
/// value, absent fields are left untouched.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMetadataRequest {
    #[validate(length(min = 1, max = 255, message = "Must be 1-255 characters"))]
    pub original_name: Option<String>,

    #[validate(length(max = 1024, message = "Must be at most 1024 characters"))]
    pub description: Option<String>,
}

impl UpdateMetadataRequest {
    pub fn is_empty(&self) -> bool {
        self.original_name.is_none() && self.description.is_none()
    }
}

#[derive(Debug, Serialize)]
pub struct TransformResponse {
    pub id: Uuid,
    pub transformed_url: String,
    pub metadata: ImageMetadata,
}
