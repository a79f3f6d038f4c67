use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::AppError;
use crate::repositories::media::{MediaStore, UploadedMedia};
use crate::settings::AppConfig;

const API_BASE: &str = "https://api.cloudinary.com";
const DELIVERY_BASE: &str = "https://res.cloudinary.com";

/// Cloudinary-backed media boundary. Original bytes live remotely under a
/// durable public id; derived assets are addressed purely by URL, so
/// `transformed_url` never touches the network.
#[derive(Clone)]
pub struct CloudinaryStore {
    http: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    upload_preset: String,
    upload_folder: String,
}

#[derive(Debug, Deserialize)]
struct UploadResult {
    public_id: String,
    secure_url: String,
    width: i32,
    height: i32,
}

impl CloudinaryStore {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.media_timeout_secs))
            .build()
            .map_err(|e| AppError::InternalError(format!("HTTP client init failed: {}", e)))?;

        Ok(CloudinaryStore {
            http,
            cloud_name: config.cloudinary_cloud_name.clone(),
            api_key: config.cloudinary_api_key.clone(),
            api_secret: config.cloudinary_api_secret.clone(),
            upload_preset: config.cloudinary_upload_preset.clone(),
            upload_folder: config.upload_folder.clone(),
        })
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn upload(&self, bytes: Vec<u8>, file_name: &str) -> Result<UploadedMedia, AppError> {
        let url = format!("{}/v1_1/{}/image/upload", API_BASE, self.cloud_name);

        let file_part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", self.upload_folder.clone());

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Cloudinary upload failed: {}", e);
                AppError::InternalError("Failed to upload image".to_string())
            })?;

        if !response.status().is_success() {
            tracing::error!("Cloudinary upload rejected with status {}", response.status());
            return Err(AppError::InternalError("Failed to upload image".to_string()));
        }

        let result: UploadResult = response.json().await.map_err(|e| {
            tracing::error!("Cloudinary upload response unreadable: {}", e);
            AppError::InternalError("Failed to upload image".to_string())
        })?;

        tracing::info!("Image uploaded to Cloudinary: {}", result.public_id);

        Ok(UploadedMedia {
            content_id: result.public_id,
            url: result.secure_url,
            width: result.width,
            height: result.height,
        })
    }

    fn transformed_url(&self, content_id: &str, directives: &[String]) -> String {
        if directives.is_empty() {
            return format!(
                "{}/{}/image/upload/{}",
                DELIVERY_BASE, self.cloud_name, content_id
            );
        }

        format!(
            "{}/{}/image/upload/{}/{}",
            DELIVERY_BASE,
            self.cloud_name,
            directives.join("/"),
            content_id
        )
    }

    async fn release(&self, content_id: &str) -> Result<(), AppError> {
        let url = format!(
            "{}/v1_1/{}/resources/image/upload",
            API_BASE, self.cloud_name
        );

        let response = self
            .http
            .delete(&url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .query(&[("public_ids[]", content_id)])
            .send()
            .await
            .map_err(|e| {
                AppError::InternalError(format!("Failed to release remote content: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::InternalError(format!(
                "Remote release rejected with status {}",
                response.status()
            )));
        }

        tracing::info!("Released remote content: {}", content_id);
        Ok(())
    }
}
