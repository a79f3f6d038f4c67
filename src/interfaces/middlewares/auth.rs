use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, HttpResponse,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, task::{Context, Poll}};

use crate::{errors::AuthError, AppState};

/// Gates every resource operation behind bearer-credential verification:
/// signature + expiry first, then resolution of the encoded subject to a
/// live user record. A stale subject is rejected exactly like a bad
/// credential.
pub struct AuthMiddleware;

impl<S> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let path = req.path();
            let method = req.method().as_str();

            if is_public_route(path, method) {
                return service.call(req).await;
            }

            let state = req.app_data::<web::Data<AppState>>()
                .ok_or_else(|| {
                    tracing::error!("AppState missing in middleware");
                    AuthError::MissingJwtService
                })?
                .clone();

            let token = match extract_token(&req) {
                Some(token) => token,
                None => {
                    tracing::warn!("Missing or malformed Authorization header");
                    return Ok(unauthorized_response(req, "Missing or invalid credentials"));
                }
            };

            let (claims, user) = match state.auth_handler.authenticate(&token).await {
                Ok(authenticated) => authenticated,
                Err(AuthError::TokenExpired) => {
                    return Ok(unauthorized_response(req, "Token has expired"));
                }
                Err(AuthError::SubjectNotFound) => {
                    tracing::warn!("Credential subject no longer resolves to a user");
                    return Ok(unauthorized_response(req, "Subject no longer exists"));
                }
                Err(_) => {
                    return Ok(unauthorized_response(req, "Invalid token"));
                }
            };

            tracing::debug!("Authenticated request for user {}", user.id);
            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}

fn is_public_route(path: &str, method: &str) -> bool {
    if method == "OPTIONS" {
        return true;
    }

    matches!(
        (path, method),
        ("/", "GET") |
        ("/api/v1/auth/register", "POST") |
        ("/api/v1/auth/login", "POST") |
        ("/api/v1/system/health", "GET")
    )
}

fn extract_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| {
            let parts: Vec<&str> = header.split_whitespace().collect();
            if parts.len() == 2 && parts[0].eq_ignore_ascii_case("bearer") {
                Some(parts[1].to_string())
            } else {
                None
            }
        })
}

fn unauthorized_response(req: ServiceRequest, message: &str) -> ServiceResponse<BoxBody> {
    let response = HttpResponse::Unauthorized().json(serde_json::json!({
        "success": false,
        "error": message
    }));
    req.into_response(response)
}
