use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;

use crate::errors::AuthError;

pub fn json_error(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({
        "success": false,
        "error": message
    }))
}

pub fn json_success<T: Serialize>(status: StatusCode, data: T) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({
        "success": true,
        "data": data
    }))
}

pub fn handle_auth_handler_error(e: AuthError) -> HttpResponse {
    e.error_response()
}
