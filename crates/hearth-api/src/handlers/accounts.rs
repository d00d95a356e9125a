//! Account handlers

use axum::{
    extract::{Path, State},
    Json,
};
use hearth_service::{AccountService, UpdateProfileRequest, UserResponse};

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::{parse_path_id, ApiResult, NoContent};
use crate::state::AppState;

/// Get own profile
///
/// GET /users/@me
pub async fn get_me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<UserResponse>> {
    let user = AccountService::new(state.service_context())
        .me(auth.user_id)
        .await?;
    Ok(Json(user))
}

/// Update own profile
///
/// PATCH /users/@me
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = AccountService::new(state.service_context())
        .update_profile(auth.user_id, request)
        .await?;
    Ok(Json(user))
}

/// Get another user's public profile
///
/// GET /users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let user_id = parse_path_id(&user_id)?;
    let user = AccountService::new(state.service_context())
        .get_user(user_id)
        .await?;
    Ok(Json(user))
}

/// Trigger the verification mail
///
/// POST /users/@me/verification-email
pub async fn send_verification_email(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<NoContent> {
    let base_url = format!("https://{}", state.config().api.address());
    AccountService::new(state.service_context())
        .send_verification_email(auth.user_id, &base_url)
        .await?;
    Ok(NoContent)
}

/// Redeem a verification token
///
/// GET /verify-email/{token}
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let user = AccountService::new(state.service_context())
        .verify_email(&token)
        .await?;
    Ok(Json(user))
}
