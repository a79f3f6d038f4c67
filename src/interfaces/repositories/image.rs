use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    entities::image::{Image, ImageInsert, UpdateMetadataRequest},
    errors::AppError,
    repositories::sqlx_repo::SqlxImageRepo,
};

/// Helper to compute OFFSET safely from 1-based `page` and `limit`.
pub fn page_offset(page: u32, limit: u32) -> i64 {
    let page = page.saturating_sub(1);
    (page as i64) * (limit as i64)
}

/// Ownership-scoped image store. Every operation that takes an image id
/// also takes the caller's user id, and the ownership filter is part of
/// the query itself: a record owned by someone else is indistinguishable
/// from an absent one, and there is no read-then-check window.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn create(&self, image: &ImageInsert) -> Result<Image, AppError>;
    async fn get_owned(&self, id: &Uuid, owner_id: &Uuid) -> Result<Image, AppError>;
    async fn list_owned(&self, owner_id: &Uuid, page: u32, limit: u32) -> Result<(Vec<Image>, i64), AppError>;
    async fn merge_metadata(&self, id: &Uuid, owner_id: &Uuid, patch: &UpdateMetadataRequest) -> Result<Image, AppError>;
    async fn delete(&self, id: &Uuid, owner_id: &Uuid) -> Result<(), AppError>;
}

impl SqlxImageRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxImageRepo { pool }
    }
}

#[async_trait]
impl ImageRepository for SqlxImageRepo {
    async fn create(&self, image: &ImageInsert) -> Result<Image, AppError> {
        let created = sqlx::query_as::<_, Image>(
            r#"
            INSERT INTO images (
                user_id, content_id, url, original_name,
                file_size, format, width, height
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(image.user_id)
        .bind(&image.content_id)
        .bind(&image.url)
        .bind(&image.original_name)
        .bind(image.file_size)
        .bind(&image.format)
        .bind(image.width)
        .bind(image.height)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_owned(&self, id: &Uuid, owner_id: &Uuid) -> Result<Image, AppError> {
        sqlx::query_as::<_, Image>("SELECT * FROM images WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))
    }

    async fn list_owned(&self, owner_id: &Uuid, page: u32, limit: u32) -> Result<(Vec<Image>, i64), AppError> {
        let offset = page_offset(page, limit);

        // Stable creation-order pages; id breaks created_at ties
        let images = sqlx::query_as::<_, Image>(
            r#"
            SELECT * FROM images
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM images WHERE user_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((images, total))
    }

    async fn merge_metadata(&self, id: &Uuid, owner_id: &Uuid, patch: &UpdateMetadataRequest) -> Result<Image, AppError> {
        // COALESCE preserves fields the caller did not provide
        sqlx::query_as::<_, Image>(
            r#"
            UPDATE images SET
                original_name = COALESCE($3, original_name),
                description = COALESCE($4, description),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(&patch.original_name)
        .bind(&patch.description)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))
    }

    async fn delete(&self, id: &Uuid, owner_id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Image not found".to_string()));
        }

        Ok(())
    }
}
