use uuid::Uuid;
use validator::Validate;

use crate::entities::image::{
    Image, ImageInsert, ImageListResponse, ImageResponse, ImageSummary, Pagination,
    TransformResponse, UpdateMetadataRequest,
};
use crate::entities::transform::{cache_key, TransformationRequest};
use crate::errors::AppError;
use crate::infrastructure::cache::redis_cache::TransformCache;
use crate::repositories::cache::CacheStore;
use crate::repositories::image::ImageRepository;
use crate::repositories::media::MediaStore;
use crate::use_cases::dispatch::dispatch;

pub struct ImagesHandler<R, M, C>
where
    R: ImageRepository,
    M: MediaStore,
    C: CacheStore,
{
    pub image_repo: R,
    pub media: M,
    pub cache: TransformCache<C>,
}

impl<R, M, C> ImagesHandler<R, M, C>
where
    R: ImageRepository,
    M: MediaStore,
    C: CacheStore,
{
    pub fn new(image_repo: R, media: M, cache: TransformCache<C>) -> Self {
        ImagesHandler {
            image_repo,
            media,
            cache,
        }
    }

    /// Uploads original bytes to the remote boundary and records the
    /// resulting durable content id under the uploading user.
    pub async fn upload(
        &self,
        owner_id: &Uuid,
        bytes: Vec<u8>,
        file_name: &str,
        format: &str,
    ) -> Result<ImageResponse, AppError> {
        let file_size = bytes.len() as i64;
        let uploaded = self.media.upload(bytes, file_name).await?;

        let image = self
            .image_repo
            .create(&ImageInsert {
                user_id: *owner_id,
                content_id: uploaded.content_id,
                url: uploaded.url,
                original_name: file_name.to_string(),
                file_size,
                format: format.to_string(),
                width: uploaded.width,
                height: uploaded.height,
            })
            .await?;

        tracing::info!("Image uploaded by user {}: {}", owner_id, image.content_id);
        Ok(image.into())
    }

    pub async fn get_image(&self, id: &Uuid, owner_id: &Uuid) -> Result<ImageResponse, AppError> {
        let image = self.image_repo.get_owned(id, owner_id).await?;
        Ok(image.into())
    }

    pub async fn list_images(
        &self,
        owner_id: &Uuid,
        page: u32,
        limit: u32,
    ) -> Result<ImageListResponse, AppError> {
        let (images, total) = self.image_repo.list_owned(owner_id, page, limit).await?;

        Ok(ImageListResponse {
            data: images.into_iter().map(ImageSummary::from).collect(),
            pagination: Pagination { page, limit, total },
        })
    }

    /// Resolves a transformation for an owned image: cache hit returns
    /// the memoized locator; on miss the dispatcher computes one and the
    /// result is stored under a fresh lease. Concurrent misses may each
    /// dispatch; recomputation is idempotent and the last write wins
    /// with an equivalent locator.
    pub async fn transform(
        &self,
        id: &Uuid,
        owner_id: &Uuid,
        request: TransformationRequest,
    ) -> Result<TransformResponse, AppError> {
        request.validate()?;
        if request.is_empty() {
            return Err(AppError::validation(
                "transformations",
                "At least one transformation is required",
            ));
        }

        // Ownership is enforced before any cache access
        let image = self.image_repo.get_owned(id, owner_id).await?;

        let key = cache_key(&image.content_id, &request);
        if let Some(cached_url) = self.cache.lookup(&key).await {
            tracing::info!("Serving cached transformed image: {}", key);
            return Ok(transform_response(image, cached_url));
        }

        let transformed_url = dispatch(&self.media, &image.content_id, &request)?;
        self.cache
            .store(&key, &transformed_url, self.cache.default_lease())
            .await;

        tracing::info!("Image transformed for user {}: {}", owner_id, image.content_id);
        Ok(transform_response(image, transformed_url))
    }

    pub async fn update_metadata(
        &self,
        id: &Uuid,
        owner_id: &Uuid,
        patch: UpdateMetadataRequest,
    ) -> Result<ImageResponse, AppError> {
        patch.validate()?;
        if patch.is_empty() {
            return Err(AppError::validation(
                "metadata",
                "At least one metadata field is required",
            ));
        }

        let image = self.image_repo.merge_metadata(id, owner_id, &patch).await?;
        tracing::info!("Metadata updated for image {}", image.content_id);
        Ok(image.into())
    }

    /// Deletes an owned image. The remote release is attempted before the
    /// local record is removed; a failed release is logged and does not
    /// keep the record alive, since the delete must stay idempotent
    /// against a dead provider.
    pub async fn delete(&self, id: &Uuid, owner_id: &Uuid) -> Result<(), AppError> {
        let image = self.image_repo.get_owned(id, owner_id).await?;

        if let Err(e) = self.media.release(&image.content_id).await {
            tracing::warn!("Remote release failed for {}: {}", image.content_id, e);
        }

        self.image_repo.delete(id, owner_id).await?;

        tracing::info!("Image deleted by user {}: {}", owner_id, image.content_id);
        Ok(())
    }
}

fn transform_response(image: Image, transformed_url: String) -> TransformResponse {
    TransformResponse {
        id: image.id,
        transformed_url,
        metadata: image.metadata(),
    }
}
