use serde::{Deserialize, Serialize};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject of the token, typically the user ID
    pub sub: String, // user ID
    /// Expiration timestamp of the token
    pub exp: usize, // expiration timestamp
    /// Issued at timestamp of the token
    pub iat: usize, // issued at timestamp
}

/// Custom error type for authentication-related errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The token is missing, malformed, or expired
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl actix_web::ResponseError for AuthError {
    fn error_response(&self) -> actix_web::HttpResponse {
        actix_web::HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "invalid_token",
            "message": "Invalid or expired token"
        }))
    }
}
