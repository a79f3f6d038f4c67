use serde::{Serialize, Deserialize};

use crate::entities::user::PublicUser;

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: PublicUser,
}

impl AuthResponse {
    pub fn new(access_token: String, user: PublicUser) -> Self {
        AuthResponse {
            access_token,
            token_type: "Bearer".to_string(),
            user,
        }
    }
}

/// Session credential claims. Stateless: a token is valid until `exp`
/// passes; there is no server-side revocation before natural expiry.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}
