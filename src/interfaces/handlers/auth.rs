use actix_web::http::StatusCode;
use actix_web::{post, web, HttpResponse, Responder};

use crate::entities::user::{LoginUser, NewUser};
use crate::handlers::json_error::{handle_auth_handler_error, json_success};
use crate::use_cases::extractors::AuthClaims;
use crate::AppState;

#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    user: web::Json<NewUser>,
) -> impl Responder {
    match state.auth_handler.register(user.into_inner()).await {
        Ok(response) => json_success(StatusCode::CREATED, response),
        Err(e) => e.to_http_response(),
    }
}

#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    user: web::Json<LoginUser>,
) -> impl Responder {
    match state.auth_handler.login(user.into_inner()).await {
        Ok(auth_response) => json_success(StatusCode::OK, auth_response),
        Err(e) => handle_auth_handler_error(e),
    }
}

/// Tokens are self-contained and expire on their own; logout exists so
/// clients have a uniform endpoint to drop their credential against.
#[post("/logout")]
pub async fn logout(claims: AuthClaims) -> impl Responder {
    tracing::info!("User logged out: {}", claims.0.sub);
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": { "message": "Logged out successfully" }
    }))
}
