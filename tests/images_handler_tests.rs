
use mockall::predicate::*;
use test_doubles::*;
use uuid::Uuid;

use image_service_backend::cache::redis_cache::TransformCache;
use image_service_backend::entities::image::UpdateMetadataRequest;
use image_service_backend::entities::transform::{Resize, TransformationRequest};
use image_service_backend::errors::AppError;
use image_service_backend::repositories::media::UploadedMedia;
use image_service_backend::use_cases::images::ImagesHandler;

fn resize_request() -> TransformationRequest {
    TransformationRequest {
        resize: Some(Resize {
            width: 200,
            height: 200,
        }),
        ..Default::default()
    }
}

#[actix_rt::test]
async fn repeated_transform_is_served_from_cache() {
    let image_id = Uuid::new_v4();
    let owner_id = Uuid::new_v4();

    let mut repo = MockImageRepo::new();
    repo.expect_get_owned()
        .with(eq(image_id), eq(owner_id))
        .times(2)
        .returning(move |id, owner| Ok(sample_image(*id, *owner, "image-service/abc123")));

    let mut media = MockMedia::new();
    // Second request must not reach the dispatcher
    media
        .expect_transformed_url()
        .times(1)
        .returning(|_, _| "https://cdn.test/derived/abc123".to_string());

    let handler = ImagesHandler::new(repo, media, TransformCache::new(MemoryCache::new(), 3600));

    let first = handler
        .transform(&image_id, &owner_id, resize_request())
        .await
        .unwrap();
    let second = handler
        .transform(&image_id, &owner_id, resize_request())
        .await
        .unwrap();

    assert_eq!(first.transformed_url, second.transformed_url);
    assert_ne!(
        first.transformed_url,
        "https://res.cloudinary.com/demo/image/upload/image-service/abc123"
    );
}

#[actix_rt::test]
async fn transform_for_foreign_image_is_not_found() {
    let image_id = Uuid::new_v4();
    let stranger_id = Uuid::new_v4();

    let mut repo = MockImageRepo::new();
    repo.expect_get_owned()
        .with(eq(image_id), eq(stranger_id))
        .times(1)
        .returning(|_, _| Err(AppError::NotFound("Image not found".to_string())));

    let mut media = MockMedia::new();
    media.expect_transformed_url().times(0);

    let handler = ImagesHandler::new(repo, media, TransformCache::new(MemoryCache::new(), 3600));

    let result = handler
        .transform(&image_id, &stranger_id, resize_request())
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[actix_rt::test]
async fn empty_descriptor_is_rejected_before_any_lookup() {
    let mut repo = MockImageRepo::new();
    repo.expect_get_owned().times(0);

    let handler = ImagesHandler::new(
        repo,
        MockMedia::new(),
        TransformCache::new(MemoryCache::new(), 3600),
    );

    let result = handler
        .transform(&Uuid::new_v4(), &Uuid::new_v4(), TransformationRequest::default())
        .await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[actix_rt::test]
async fn unreachable_cache_backend_recomputes_every_time() {
    let image_id = Uuid::new_v4();
    let owner_id = Uuid::new_v4();

    let mut repo = MockImageRepo::new();
    repo.expect_get_owned()
        .times(2)
        .returning(move |id, owner| Ok(sample_image(*id, *owner, "image-service/abc123")));

    let mut media = MockMedia::new();
    media
        .expect_transformed_url()
        .times(2)
        .returning(|_, _| "https://cdn.test/derived/abc123".to_string());

    let handler = ImagesHandler::new(repo, media, TransformCache::new(FailingCache, 3600));

    for _ in 0..2 {
        let response = handler
            .transform(&image_id, &owner_id, resize_request())
            .await
            .unwrap();
        assert_eq!(response.transformed_url, "https://cdn.test/derived/abc123");
    }
}

#[actix_rt::test]
async fn zero_lease_expires_immediately() {
    let image_id = Uuid::new_v4();
    let owner_id = Uuid::new_v4();

    let mut repo = MockImageRepo::new();
    repo.expect_get_owned()
        .times(2)
        .returning(move |id, owner| Ok(sample_image(*id, *owner, "image-service/abc123")));

    let mut media = MockMedia::new();
    media
        .expect_transformed_url()
        .times(2)
        .returning(|_, _| "https://cdn.test/derived/abc123".to_string());

    let handler = ImagesHandler::new(repo, media, TransformCache::new(MemoryCache::new(), 0));

    for _ in 0..2 {
        handler
            .transform(&image_id, &owner_id, resize_request())
            .await
            .unwrap();
    }
}

#[actix_rt::test]
async fn upload_records_the_remote_result() {
    let owner_id = Uuid::new_v4();

    let mut media = MockMedia::new();
    media.expect_upload().times(1).returning(|_, file_name| {
        Ok(UploadedMedia {
            content_id: "image-service/new123".into(),
            url: format!("https://cdn.test/{}", file_name),
            width: 640,
            height: 480,
        })
    });

    let mut repo = MockImageRepo::new();
    repo.expect_create().times(1).returning(move |insert| {
        let mut image = sample_image(Uuid::new_v4(), insert.user_id, &insert.content_id);
        image.original_name = insert.original_name.clone();
        image.file_size = insert.file_size;
        image.width = insert.width;
        image.height = insert.height;
        Ok(image)
    });

    let handler = ImagesHandler::new(repo, media, TransformCache::new(MemoryCache::new(), 3600));

    let response = handler
        .upload(&owner_id, vec![0xFF, 0xD8, 0xFF], "photo.jpg", "jpg")
        .await
        .unwrap();

    assert_eq!(response.metadata.original_name, "photo.jpg");
    assert_eq!(response.metadata.width, 640);
    assert_eq!(response.metadata.height, 480);
}

#[actix_rt::test]
async fn delete_survives_a_failed_remote_release() {
    let image_id = Uuid::new_v4();
    let owner_id = Uuid::new_v4();

    let mut repo = MockImageRepo::new();
    repo.expect_get_owned()
        .times(1)
        .returning(move |id, owner| Ok(sample_image(*id, *owner, "image-service/abc123")));
    repo.expect_delete()
        .with(eq(image_id), eq(owner_id))
        .times(1)
        .returning(|_, _| Ok(()));

    let mut media = MockMedia::new();
    media
        .expect_release()
        .with(eq("image-service/abc123"))
        .times(1)
        .returning(|_| Err(AppError::InternalError("provider down".into())));

    let handler = ImagesHandler::new(repo, media, TransformCache::new(MemoryCache::new(), 3600));

    assert!(handler.delete(&image_id, &owner_id).await.is_ok());
}

#[actix_rt::test]
async fn empty_metadata_patch_is_rejected() {
    let mut repo = MockImageRepo::new();
    repo.expect_merge_metadata().times(0);

    let handler = ImagesHandler::new(
        repo,
        MockMedia::new(),
        TransformCache::new(MemoryCache::new(), 3600),
    );

    let patch = UpdateMetadataRequest {
        original_name: None,
        description: None,
    };
    let result = handler
        .update_metadata(&Uuid::new_v4(), &Uuid::new_v4(), patch)
        .await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[actix_rt::test]
async fn storing_the_same_entry_twice_is_idempotent() {
    let cache = TransformCache::new(MemoryCache::new(), 3600);
    let key = "transform:image-service/abc123:resize:200x200";

    cache.store(key, "https://cdn.test/derived/abc123", 3600).await;
    cache.store(key, "https://cdn.test/derived/abc123", 3600).await;

    assert_eq!(
        cache.lookup(key).await.as_deref(),
        Some("https://cdn.test/derived/abc123")
    );
}

#[actix_rt::test]
async fn listing_reports_pagination_totals() {
    let owner_id = Uuid::new_v4();

    let mut repo = MockImageRepo::new();
    repo.expect_list_owned()
        .with(eq(owner_id), eq(2u32), eq(10u32))
        .times(1)
        .returning(move |owner, _, _| {
            let images = (0..10)
                .map(|_| sample_image(Uuid::new_v4(), *owner, "image-service/abc123"))
                .collect();
            Ok((images, 25))
        });

    let handler = ImagesHandler::new(
        repo,
        MockMedia::new(),
        TransformCache::new(MemoryCache::new(), 3600),
    );

    let response = handler.list_images(&owner_id, 2, 10).await.unwrap();

    assert_eq!(response.data.len(), 10);
    assert_eq!(response.pagination.page, 2);
    assert_eq!(response.pagination.total, 25);
}
