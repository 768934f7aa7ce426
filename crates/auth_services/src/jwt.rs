use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::types::{AuthError, Claims};

/// Verifies bearer tokens against the shared secret the identity
/// provider signs with.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Creates a service keyed from the `JWT_SECRET` environment variable.
    pub fn new() -> Self {
        let secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "your-secret-key-change-this-in-production".to_string());

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    /// Issues a token for local development and tests. Production tokens
    /// come from the external identity provider signed with the same secret.
    pub fn issue_token(&self, user_id: &Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(Duration::hours(1))
            .expect("valid timestamp")
            .timestamp() as usize;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiration,
            iat: now.timestamp() as usize,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verifies a token's signature and expiry, returning its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }

    /// Verifies a token and parses its subject as the user ID.
    pub fn extract_user_id_from_token(&self, token: &str) -> Result<Uuid, AuthError> {
        let claims = self.verify_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
            AuthError::Jwt(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidSubject,
            ))
        })?;

        Ok(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let service = JwtService::new();
        let user_id = Uuid::new_v4();

        let token = service.issue_token(&user_id).unwrap();
        let extracted = service.extract_user_id_from_token(&token).unwrap();

        assert_eq!(extracted, user_id);
    }

    #[test]
    fn test_garbage_token_rejected() {
        let service = JwtService::new();
        assert!(service.extract_user_id_from_token("not-a-token").is_err());
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let service = JwtService::new();

        let claims = Claims {
            sub: "someone".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
            iat: Utc::now().timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &service.encoding_key).unwrap();

        assert!(service.extract_user_id_from_token(&token).is_err());
    }
}
