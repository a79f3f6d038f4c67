use uuid::Uuid;
use validator::Validate;

use crate::entities::token::{AuthResponse, Claims};
use crate::entities::user::{LoginUser, NewUser, RegisterResponse, User};
use crate::errors::{AppError, AuthError};
use crate::interfaces::repositories::user::UserRepository;
use crate::auth::password::{hash_password, verify_password};
use crate::repositories::token::TokenService;

pub struct AuthHandler<R, T>
where
    R: UserRepository,
    T: TokenService,
{
    pub user_repo: R,
    pub token_service: T,
}

impl<R, T> AuthHandler<R, T>
where
    R: UserRepository,
    T: TokenService,
{
    pub fn new(user_repo: R, token_service: T) -> Self {
        AuthHandler {
            user_repo,
            token_service,
        }
    }

    /// Registers a new user after validation and password hashing, and
    /// issues a first session credential.
    pub async fn register(&self, request: NewUser) -> Result<RegisterResponse, AppError> {
        request.validate()?;

        let existing = self
            .user_repo
            .find_by_email_or_username(&request.email, &request.username)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict("Username or email already exists".to_string()));
        }

        let hashed_password = hash_password(&request.password)?;
        let user_insert = request.prepare_for_insert(hashed_password);

        let user = self.user_repo.create_user(&user_insert).await?;

        let token = self
            .token_service
            .issue_token(&user.id)
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        tracing::info!("User registered: {}", user.username);

        Ok(RegisterResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            token,
        })
    }

    /// Logs in a user by validating credentials and issuing a session token.
    pub async fn login(&self, request: LoginUser) -> Result<AuthResponse, AuthError> {
        request.validate()?;

        let user = self.user_repo.find_by_email(&request.email)
            .await
            .map_err(|_e| AuthError::WrongCredentials)?
            .ok_or(AuthError::WrongCredentials)?;

        let is_password_valid = verify_password(&request.password, &user.password_hash)
            .map_err(|_| AuthError::WrongCredentials)?;
        if !is_password_valid {
            return Err(AuthError::WrongCredentials);
        }

        let token = self.token_service.issue_token(&user.id).map_err(|e| {
            tracing::warn!("Failed to create JWT: {}", e);
            AuthError::TokenCreation
        })?;

        tracing::info!("User logged in: {}", user.username);
        Ok(AuthResponse::new(token, user.into()))
    }

    /// Verifies a bearer credential and resolves it to a live user. A
    /// valid signature whose subject no longer exists is rejected the
    /// same way as a bad credential (401).
    pub async fn authenticate(&self, token: &str) -> Result<(Claims, User), AuthError> {
        let decoded = self.token_service.decode_token(token)?;
        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AuthError::InvalidUserId)?;

        let user = self
            .user_repo
            .find_by_id(&user_id)
            .await
            .map_err(|_| AuthError::SubjectNotFound)?
            .ok_or(AuthError::SubjectNotFound)?;

        Ok((decoded.claims, user))
    }
}
