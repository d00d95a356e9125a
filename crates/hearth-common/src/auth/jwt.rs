//! Access token service
//!
//! Account passwords and the OAuth2 handshake live with an external
//! identity provider; what this service owns is the bearer token both the
//! REST API and the WebSocket upgrade validate. REST reads it from the
//! `Authorization` header, the gateway from the `?token=` query parameter.

use chrono::{Duration, Utc};
use hearth_core::Snowflake;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Claims carried in an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Login email, for audit logging
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Get the user ID as a Snowflake
    ///
    /// # Errors
    /// Returns an error if the subject cannot be parsed as a Snowflake
    pub fn user_id(&self) -> Result<Snowflake, AppError> {
        self.sub
            .parse::<i64>()
            .map(Snowflake::new)
            .map_err(|_| AppError::InvalidToken)
    }
}

/// Issues and validates access tokens
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_secs: i64,
}

impl TokenService {
    /// Create a new token service with the given secret and expiry
    #[must_use]
    pub fn new(secret: &str, expiry_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_secs,
        }
    }

    /// Issue an access token for a user
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue(&self, user_id: Snowflake, email: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.expiry_secs)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("token encoding failed: {e}")))
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    /// Returns `InvalidToken` for malformed or mis-signed tokens and
    /// `TokenExpired` when the expiry has passed.
    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret-please-rotate", 3600)
    }

    #[test]
    fn test_issue_and_validate() {
        let svc = service();
        let token = svc.issue(Snowflake::new(42), "ada@example.com").unwrap();

        let claims = svc.validate(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), Snowflake::new(42));
        assert_eq!(claims.email, "ada@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_garbage_token_rejected() {
        let svc = service();
        assert!(matches!(
            svc.validate("not.a.token"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue(Snowflake::new(1), "x@example.com").unwrap();
        let other = TokenService::new("different-secret", 3600);
        assert!(matches!(other.validate(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let svc = TokenService::new("test-secret-please-rotate", -120);
        let token = svc.issue(Snowflake::new(1), "x@example.com").unwrap();
        assert!(matches!(
            service().validate(&token),
            Err(AppError::TokenExpired)
        ));
    }
}
