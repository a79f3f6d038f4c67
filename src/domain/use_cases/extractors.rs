use actix_web::{FromRequest, HttpRequest, HttpMessage};
use futures_util::future::{ready, Ready};
use uuid::Uuid;

use crate::{entities::token::Claims, errors::AuthError};

/// Extractor for authenticated claims, populated by the auth middleware.
/// Returns 401 if the request was not authenticated.
#[derive(Debug)]
pub struct AuthClaims(pub Claims);

impl FromRequest for AuthClaims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<Claims>() {
            Some(claims) => ready(Ok(AuthClaims(claims.clone()))),
            None => ready(Err(AuthError::MissingCredentials.into())),
        }
    }
}

/// Extractor for the authenticated subject id. Every ownership-scoped
/// handler takes this alongside the resource id.
#[derive(Debug, Clone, Copy)]
pub struct AuthSubject(pub Uuid);

impl FromRequest for AuthSubject {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let subject = req
            .extensions()
            .get::<Claims>()
            .ok_or(AuthError::MissingCredentials)
            .and_then(|claims| {
                Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidUserId)
            });

        match subject {
            Ok(id) => ready(Ok(AuthSubject(id))),
            Err(e) => ready(Err(e.into())),
        }
    }
}
