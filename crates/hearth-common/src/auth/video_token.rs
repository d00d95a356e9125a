//! Video join token issuing
//!
//! The media server is an external collaborator: all this side owns is a
//! signed join grant the client presents to it. The trait keeps the
//! service layer testable without a signing key.

use chrono::{Duration, Utc};
use hearth_core::{Room, User};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::config::VideoConfig;
use crate::error::AppError;

/// Issues signed join tokens for video calls
pub trait VideoTokenIssuer: Send + Sync {
    /// Issue a join token for `user` entering the call of `room`
    fn issue(&self, room: &Room, user: &User) -> Result<String, AppError>;

    /// Media server URL clients connect to
    fn server_url(&self) -> &str;
}

/// Claims of a join grant
#[derive(Debug, Serialize, Deserialize)]
struct VideoClaims {
    /// API key identifying this deployment
    iss: String,
    /// Display identity inside the call
    sub: String,
    iat: i64,
    exp: i64,
    /// Room the grant is valid for
    room: String,
    room_join: bool,
}

/// JWT-signing token issuer
pub struct JwtVideoTokenIssuer {
    server_url: String,
    api_key: String,
    encoding_key: EncodingKey,
    ttl_secs: i64,
}

impl JwtVideoTokenIssuer {
    /// Create an issuer from configuration
    #[must_use]
    pub fn from_config(config: &VideoConfig) -> Self {
        Self {
            server_url: config.server_url.clone(),
            api_key: config.api_key.clone(),
            encoding_key: EncodingKey::from_secret(config.api_secret.as_bytes()),
            ttl_secs: config.token_ttl_secs,
        }
    }

    fn room_name(room: &Room) -> String {
        room.title
            .clone()
            .unwrap_or_else(|| format!("room-{}", room.id))
    }
}

impl VideoTokenIssuer for JwtVideoTokenIssuer {
    fn issue(&self, room: &Room, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = VideoClaims {
            iss: self.api_key.clone(),
            sub: user.full_name(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp(),
            room: Self::room_name(room),
            room_join: true,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("join token encoding failed: {e}")))
    }

    fn server_url(&self) -> &str {
        &self.server_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::Snowflake;

    fn issuer() -> JwtVideoTokenIssuer {
        JwtVideoTokenIssuer::from_config(&VideoConfig {
            server_url: "wss://video.hearth.example".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            token_ttl_secs: 3600,
        })
    }

    #[test]
    fn test_issue_produces_decodable_token() {
        use jsonwebtoken::{decode, DecodingKey, Validation};

        let room = Room::new_group(
            Snowflake::new(1),
            Snowflake::new(10),
            "Family call".to_string(),
            None,
        );
        let user = User::new(
            Snowflake::new(10),
            "ada@example.com".to_string(),
            "ada".to_string(),
        );

        let token = issuer().issue(&room, &user).unwrap();
        let data = decode::<VideoClaims>(
            &token,
            &DecodingKey::from_secret(b"secret"),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(data.claims.room, "Family call");
        assert!(data.claims.room_join);
        assert_eq!(data.claims.sub, "ada");
    }

    #[test]
    fn test_untitled_room_gets_fallback_name() {
        let room = Room::new_private(Snowflake::new(5), Snowflake::new(10));
        assert_eq!(JwtVideoTokenIssuer::room_name(&room), "room-5");
    }
}
