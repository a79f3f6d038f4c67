use jsonwebtoken::{encode, Header, decode, Validation, TokenData, Algorithm};
use chrono::{Utc, Duration};
use uuid::Uuid;

use crate::entities::token::Claims;
use crate::repositories::token::TokenService;
use crate::settings::{AppConfig, JwtKeys};
use crate::errors::AuthError;

const JWT_ALGORITHM: Algorithm = Algorithm::HS512;

#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    expiration: Duration,
}

impl JwtService {
    pub fn new(config: &AppConfig) -> Self {
        JwtService {
            keys: JwtKeys::from(config),
            expiration: Duration::minutes(config.jwt_expiration_minutes),
        }
    }

    pub fn issue_token(&self, user_id: &Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = (now + self.expiration).timestamp() as usize;

        let claims = Claims {
            sub: user_id.to_string(),
            exp,
            iat: now.timestamp() as usize,
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.encoding)
            .map_err(|_| AuthError::TokenCreation)
    }

    pub fn decode_token(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;

        decode::<Claims>(token, &self.keys.decoding, &validation).map_err(AuthError::from)
    }
}

impl TokenService for JwtService {
    fn issue_token(&self, user_id: &Uuid) -> Result<String, AuthError> {
        self.issue_token(user_id)
    }

    fn decode_token(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        self.decode_token(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::AppEnvironment;

    fn test_config(expiration_minutes: i64) -> AppConfig {
        AppConfig {
            env: AppEnvironment::Testing,
            name: "test".into(),
            port: 0,
            host: "127.0.0.1".into(),
            worker_count: 1,
            database_url: "postgres://localhost/test".into(),
            redis_url: None,
            cors_allowed_origins: vec!["*".into()],
            jwt_secret: "test_jwt_secret_that_is_long_enough_for_hs512".into(),
            jwt_expiration_minutes: expiration_minutes,
            cloudinary_cloud_name: "demo".into(),
            cloudinary_api_key: "key".into(),
            cloudinary_api_secret: "secret".into(),
            cloudinary_upload_preset: "unsigned".into(),
            upload_folder: "image-service".into(),
            media_timeout_secs: 30,
            max_upload_bytes: 5 * 1024 * 1024,
            cache_lease_secs: 3600,
            rate_limit_max_requests: 100,
            rate_limit_window_secs: 900,
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let service = JwtService::new(&test_config(60));
        let user_id = Uuid::new_v4();

        let token = service.issue_token(&user_id).unwrap();
        let decoded = service.decode_token(&token).unwrap();

        assert_eq!(decoded.claims.sub, user_id.to_string());
        assert!(decoded.claims.exp > decoded.claims.iat);
    }

    #[test]
    fn expired_token_is_rejected() {
        // Negative validity puts exp in the past beyond the default leeway
        let service = JwtService::new(&test_config(-2));
        let token = service.issue_token(&Uuid::new_v4()).unwrap();

        assert!(matches!(
            service.decode_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = JwtService::new(&test_config(60));
        let mut token = service.issue_token(&Uuid::new_v4()).unwrap();
        token.push('x');

        assert!(matches!(
            service.decode_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = JwtService::new(&test_config(60));
        let mut other = test_config(60);
        other.jwt_secret = "another_secret_that_is_also_long_enough_123".into();
        let verifier = JwtService::new(&other);

        let token = issuer.issue_token(&Uuid::new_v4()).unwrap();

        assert!(matches!(
            verifier.decode_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }
}
