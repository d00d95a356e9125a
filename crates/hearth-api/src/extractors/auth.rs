//! Authentication extractor
//!
//! Pulls the bearer token from the Authorization header and resolves it
//! to a user ID through the token service.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use hearth_core::Snowflake;

use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated caller, resolved from the access token
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// User ID from the token's subject
    pub user_id: Snowflake,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let user_id = AppState::from_ref(state)
            .token_service()
            .validate(bearer.token())
            .and_then(|claims| claims.user_id())
            .map_err(|e| {
                tracing::warn!(error = %e, "Access token rejected");
                ApiError::InvalidAuth
            })?;

        Ok(AuthUser { user_id })
    }
}
