use jsonwebtoken::TokenData;
use uuid::Uuid;

use crate::entities::token::Claims;
use crate::errors::AuthError;

/// Session token boundary: issues and verifies compact signed credentials
/// binding a subject id and an absolute expiry. There is no server-side
/// session state; a credential cannot be revoked before it expires.
pub trait TokenService: Send + Sync {
    fn issue_token(&self, user_id: &Uuid) -> Result<String, AuthError>;
    fn decode_token(&self, token: &str) -> Result<TokenData<Claims>, AuthError>;
}
