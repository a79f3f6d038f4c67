use actix_multipart::form::MultipartForm;
use actix_web::http::StatusCode;
use actix_web::{delete, get, patch, post, web, Responder};
use serde::Deserialize;
use uuid::Uuid;

use crate::constants::ALLOWED_IMAGE_MIME;
use crate::entities::image::{ImageUpload, UpdateMetadataRequest};
use crate::entities::transform::TransformationRequest;
use crate::handlers::json_error::{json_error, json_success};
use crate::use_cases::extractors::AuthSubject;
use crate::AppState;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TransformBody {
    pub transformations: TransformationRequest,
}

#[post("")]
pub async fn upload_image(
    subject: AuthSubject,
    state: web::Data<AppState>,
    form: MultipartForm<ImageUpload>,
) -> impl Responder {
    let upload = form.into_inner();
    let data = upload.image.data;

    let format = match validate_upload(&data, state.max_upload_bytes) {
        Ok(format) => format,
        Err(message) => return json_error(StatusCode::BAD_REQUEST, message),
    };

    let file_name = upload
        .image
        .file_name
        .unwrap_or_else(|| format!("upload.{}", format));

    match state
        .images_handler
        .upload(&subject.0, data.to_vec(), &file_name, format)
        .await
    {
        Ok(response) => json_success(StatusCode::CREATED, response),
        Err(e) => e.to_http_response(),
    }
}

/// Checks the configured byte cap and sniffs the real content type; the
/// client-declared type is untrusted. Returns the stored format on success.
fn validate_upload(data: &[u8], max_upload_bytes: usize) -> Result<&'static str, &'static str> {
    if data.len() > max_upload_bytes {
        return Err("File exceeds the upload size limit");
    }

    let mime = match infer::get(data) {
        Some(kind) => kind.mime_type(),
        None => return Err("Unrecognized file content"),
    };

    if !ALLOWED_IMAGE_MIME.contains(&mime) {
        return Err("Only JPEG and PNG images are allowed");
    }

    Ok(match mime {
        "image/png" => "png",
        _ => "jpg",
    })
}

#[get("/{id}")]
pub async fn get_image(
    subject: AuthSubject,
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> impl Responder {
    match state.images_handler.get_image(&id.into_inner(), &subject.0).await {
        Ok(response) => json_success(StatusCode::OK, response),
        Err(e) => e.to_http_response(),
    }
}

#[get("")]
pub async fn list_images(
    subject: AuthSubject,
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> impl Responder {
    let page = query.page.unwrap_or(DEFAULT_PAGE).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    match state.images_handler.list_images(&subject.0, page, limit).await {
        Ok(response) => json_success(StatusCode::OK, response),
        Err(e) => e.to_http_response(),
    }
}

#[post("/{id}/transform")]
pub async fn transform_image(
    subject: AuthSubject,
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<TransformBody>,
) -> impl Responder {
    let request = body.into_inner().transformations;

    match state.images_handler.transform(&id.into_inner(), &subject.0, request).await {
        Ok(response) => json_success(StatusCode::OK, response),
        Err(e) => e.to_http_response(),
    }
}

#[patch("/{id}")]
pub async fn update_metadata(
    subject: AuthSubject,
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    patch: web::Json<UpdateMetadataRequest>,
) -> impl Responder {
    match state
        .images_handler
        .update_metadata(&id.into_inner(), &subject.0, patch.into_inner())
        .await
    {
        Ok(response) => json_success(StatusCode::OK, response),
        Err(e) => e.to_http_response(),
    }
}

#[delete("/{id}")]
pub async fn delete_image(
    subject: AuthSubject,
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> impl Responder {
    match state.images_handler.delete(&id.into_inner(), &subject.0).await {
        Ok(()) => json_success(
            StatusCode::OK,
            serde_json::json!({ "message": "Image deleted successfully" }),
        ),
        Err(e) => e.to_http_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg_bytes(len: usize) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.resize(len, 0);
        bytes
    }

    #[test]
    fn upload_cap_follows_configuration() {
        let six_mb = jpeg_bytes(6 * 1024 * 1024);

        assert_eq!(validate_upload(&six_mb, 10 * 1024 * 1024), Ok("jpg"));
        assert!(validate_upload(&six_mb, 5 * 1024 * 1024).is_err());
    }

    #[test]
    fn png_uploads_keep_their_format() {
        let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.resize(64, 0);

        assert_eq!(validate_upload(&bytes, 1024), Ok("png"));
    }

    #[test]
    fn non_image_payloads_are_rejected() {
        assert!(validate_upload(b"%PDF-1.7 not an image", 1024).is_err());
    }
}
