use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;

use crate::{
    constants::START_TIME,
    repositories::{cache::CacheStore, user::UserRepository},
    AppState,
};

#[derive(Serialize)]
struct HealthCheckResponse {
    status: String,
    uptime_secs: i64,
    timestamp: String,
    database: String,
    cache: String,
    version: String,
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now = chrono::Utc::now();
    let uptime_secs = now.signed_duration_since(*START_TIME).num_seconds();

    let database = match state.auth_handler.user_repo.check_connection().await {
        Ok(_) => "OK",
        Err(_) => "Unavailable",
    };

    let cache = match state.images_handler.cache.backend().ping().await {
        Ok(_) => "OK",
        Err(crate::errors::CacheError::NotConfigured) => "Not configured",
        Err(_) => "Unavailable",
    };

    let status = if database == "OK" { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthCheckResponse {
        status: status.to_string(),
        uptime_secs,
        timestamp: now.to_rfc3339(),
        database: database.to_string(),
        cache: cache.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
