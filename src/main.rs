use std::time::Duration;

use actix_cors::Cors;
use actix_multipart::form::MultipartFormConfig;
use actix_web::{http::header, middleware::NormalizePath, web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use image_service_backend::{
    db::postgres::create_pool,
    graceful_shutdown::shutdown_signal,
    handlers::{
        auth::{login, logout, register},
        home::home,
        images::{delete_image, get_image, list_images, transform_image, update_metadata, upload_image},
        system::health_check,
    },
    middlewares::{
        auth::AuthMiddleware,
        rate_limit::{RateLimitMiddleware, RateLimiter},
    },
    settings::AppConfig,
    AppState,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let config = match AppConfig::new() {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        }
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match create_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = match AppState::new(&config, pool) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            tracing::error!("Failed to initialize application state: {}", e);
            std::process::exit(1);
        }
    };

    let limiter = RateLimiter::new(
        config.rate_limit_max_requests,
        Duration::from_secs(config.rate_limit_window_secs),
    );

    let cors_origins = config.cors_origins();
    let max_upload_bytes = config.max_upload_bytes;
    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "Starting Image Processing API v{} on {}",
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let server = HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(3600);

        for origin in &cors_origins {
            cors = if origin == "*" {
                cors.allow_any_origin()
            } else {
                cors.allowed_origin(origin)
            };
        }

        App::new()
            .app_data(app_state.clone())
            // Headroom over the file cap covers multipart framing; the
            // handler enforces the exact byte limit on the file itself
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(max_upload_bytes + 64 * 1024)
                    .memory_limit(max_upload_bytes + 64 * 1024),
            )
            .wrap(NormalizePath::trim())
            .wrap(AuthMiddleware)
            .wrap(RateLimitMiddleware::new(limiter.clone()))
            .wrap(cors)
            .wrap(TracingLogger::default())
            .service(home)
            .service(
                web::scope("/api/v1/auth")
                    .service(register)
                    .service(login)
                    .service(logout),
            )
            .service(
                web::scope("/api/v1/images")
                    .service(upload_image)
                    .service(list_images)
                    .service(transform_image)
                    .service(get_image)
                    .service(update_metadata)
                    .service(delete_image),
            )
            .service(web::scope("/api/v1/system").service(health_check))
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    }
}
