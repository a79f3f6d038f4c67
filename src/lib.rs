mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, middlewares, repositories};
pub use infrastructure::{auth, cache, db, media};

use auth::jwt::JwtService;
use cache::redis_cache::{RedisCacheStore, TransformCache};
use errors::AppError;
use media::cloudinary::CloudinaryStore;
use repositories::sqlx_repo::{SqlxImageRepo, SqlxUserRepo};
use use_cases::{auth::AuthHandler, images::ImagesHandler};

pub type AppAuthHandler = AuthHandler<SqlxUserRepo, JwtService>;
pub type AppImagesHandler = ImagesHandler<SqlxImageRepo, CloudinaryStore, RedisCacheStore>;

pub struct AppState {
    pub auth_handler: AppAuthHandler,
    pub images_handler: AppImagesHandler,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: &settings::AppConfig, pool: sqlx::PgPool) -> Result<Self, AppError> {
        let jwt_service = JwtService::new(config);
        let user_repo = SqlxUserRepo::new(pool.clone());
        let auth_handler = AuthHandler::new(user_repo, jwt_service);

        let image_repo = SqlxImageRepo::new(pool);
        let media = CloudinaryStore::new(config)?;
        let cache = TransformCache::new(
            RedisCacheStore::from_url(config.redis_url.as_deref()),
            config.cache_lease_secs,
        );
        let images_handler = ImagesHandler::new(image_repo, media, cache);

        Ok(AppState {
            auth_handler,
            images_handler,
            max_upload_bytes: config.max_upload_bytes,
        })
    }
}
