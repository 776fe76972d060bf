//! JWT Token Service
//!
//! Handles JWT creation, validation, and claims management for user authentication.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Issuer written into and required on every token
pub const TOKEN_ISSUER: &str = "ecom-server";

/// JWT Claims structure containing user information and token metadata
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// User unique identifier
    pub sub: Uuid,
    /// User email
    pub email: String,
    /// Token issued at timestamp
    pub iat: i64,
    /// Token expiration timestamp
    pub exp: i64,
    /// Token issuer
    pub iss: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to encode token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token expired")]
    Expired,

    /// Bad signature, wrong issuer, wrong shape
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// JWT Service for token operations
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtService {
    /// Create a new JWT service with the provided secret and token lifetime
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::default();
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.leeway = 0;

        Self {
            encoding_key,
            decoding_key,
            validation,
            ttl,
        }
    }

    /// Lifetime of issued tokens
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generate a JWT token for a user
    pub fn create_token(&self, user_id: Uuid, email: String) -> Result<String, TokenError> {
        let now = Utc::now();
        let expiration = now + self.ttl;

        let claims = Claims {
            sub: user_id,
            email,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            iss: TOKEN_ISSUER.to_string(),
        };

        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(TokenError::Encode)
    }

    /// Validate and decode a JWT token
    pub fn validate_token(&self, token: &str) -> Result<TokenData<Claims>, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            }
        })
    }

    /// Validate a token and return only its claims
    pub fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data = self.validate_token(token)?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test_secret", Duration::hours(1))
    }

    #[test]
    fn test_jwt_roundtrip() {
        let jwt_service = service();
        let user_id = Uuid::new_v4();
        let email = "test@example.com".to_string();

        let token = jwt_service.create_token(user_id, email.clone()).unwrap();
        let claims = jwt_service.decode_claims(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, email);
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_ttl_is_configurable() {
        let jwt_service = JwtService::new("test_secret", Duration::days(45));
        let token = jwt_service.create_token(Uuid::new_v4(), "a@b.c".into()).unwrap();
        let claims = jwt_service.decode_claims(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, 45 * 24 * 3600);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt_service = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            iat: now - 7200,
            exp: now - 10,
            iss: TOKEN_ISSUER.to_string(),
        };
        let token = jwt_service.encode_claims(&claims).unwrap();

        assert!(matches!(jwt_service.validate_token(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let jwt_service = service();
        let token = jwt_service.create_token(Uuid::new_v4(), "test@example.com".into()).unwrap();

        // Flip one character in every position of the token in turn.
        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            if bytes[i] == b'.' {
                continue;
            }
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            if tampered == token {
                continue;
            }
            assert!(
                jwt_service.validate_token(&tampered).is_err(),
                "tampered token accepted at byte {i}"
            );
        }
    }

    #[test]
    fn test_foreign_secret_is_rejected() {
        let other = JwtService::new("another_secret", Duration::hours(1));
        let token = other.create_token(Uuid::new_v4(), "test@example.com".into()).unwrap();

        assert!(matches!(service().validate_token(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_wrong_issuer_is_rejected() {
        let jwt_service = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            iat: now,
            exp: now + 600,
            iss: "someone-else".to_string(),
        };
        let token = jwt_service.encode_claims(&claims).unwrap();

        assert!(matches!(jwt_service.validate_token(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(service().validate_token("not.a.jwt").is_err());
        assert!(service().validate_token("").is_err());
    }
}
