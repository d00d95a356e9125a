//! Family handlers

use axum::{
    extract::{Path, State},
    Json,
};
use hearth_service::{
    AddFamilyMemberRequest, CreateFamilyRequest, FamilyResponse, FamilyService,
    JoinFamilyRequest,
};

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::{parse_path_id, ApiResult, Created, NoContent};
use crate::state::AppState;

/// Create a family
///
/// POST /families
pub async fn create_family(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateFamilyRequest>,
) -> ApiResult<Created<Json<FamilyResponse>>> {
    let family = FamilyService::new(state.service_context())
        .create(auth.user_id, request.name)
        .await?;
    Ok(Created(Json(family)))
}

/// Get a family (members only)
///
/// GET /families/{family_id}
pub async fn get_family(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(family_id): Path<String>,
) -> ApiResult<Json<FamilyResponse>> {
    let family_id = parse_path_id(&family_id)?;
    let family = FamilyService::new(state.service_context())
        .get(auth.user_id, family_id)
        .await?;
    Ok(Json(family))
}

/// Rename a family (creator only)
///
/// PATCH /families/{family_id}
pub async fn rename_family(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(family_id): Path<String>,
    ValidatedJson(request): ValidatedJson<CreateFamilyRequest>,
) -> ApiResult<Json<FamilyResponse>> {
    let family_id = parse_path_id(&family_id)?;
    let family = FamilyService::new(state.service_context())
        .rename(auth.user_id, family_id, request.name)
        .await?;
    Ok(Json(family))
}

/// Delete a family (creator only)
///
/// DELETE /families/{family_id}
pub async fn delete_family(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(family_id): Path<String>,
) -> ApiResult<NoContent> {
    let family_id = parse_path_id(&family_id)?;
    FamilyService::new(state.service_context())
        .delete(auth.user_id, family_id)
        .await?;
    Ok(NoContent)
}

/// Add a member
///
/// POST /families/{family_id}/members
pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(family_id): Path<String>,
    ValidatedJson(request): ValidatedJson<AddFamilyMemberRequest>,
) -> ApiResult<Json<FamilyResponse>> {
    let family_id = parse_path_id(&family_id)?;
    let user_id = parse_path_id(&request.user_id)?;
    let family = FamilyService::new(state.service_context())
        .add_member(auth.user_id, family_id, user_id, request.relation)
        .await?;
    Ok(Json(family))
}

/// Remove a member
///
/// DELETE /families/{family_id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((family_id, user_id)): Path<(String, String)>,
) -> ApiResult<Json<FamilyResponse>> {
    let family_id = parse_path_id(&family_id)?;
    let user_id = parse_path_id(&user_id)?;
    let family = FamilyService::new(state.service_context())
        .remove_member(auth.user_id, family_id, user_id)
        .await?;
    Ok(Json(family))
}

/// Join a family by invite code
///
/// POST /families/join
pub async fn join_family(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<JoinFamilyRequest>,
) -> ApiResult<Json<FamilyResponse>> {
    let family = FamilyService::new(state.service_context())
        .join_by_invite(auth.user_id, &request.invite_code)
        .await?;
    Ok(Json(family))
}

/// Grant admin rights
///
/// POST /families/{family_id}/admins/{user_id}
pub async fn promote_admin(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((family_id, user_id)): Path<(String, String)>,
) -> ApiResult<Json<FamilyResponse>> {
    let family_id = parse_path_id(&family_id)?;
    let user_id = parse_path_id(&user_id)?;
    let family = FamilyService::new(state.service_context())
        .promote_admin(auth.user_id, family_id, user_id)
        .await?;
    Ok(Json(family))
}

/// Revoke admin rights
///
/// DELETE /families/{family_id}/admins/{user_id}
pub async fn demote_admin(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((family_id, user_id)): Path<(String, String)>,
) -> ApiResult<Json<FamilyResponse>> {
    let family_id = parse_path_id(&family_id)?;
    let user_id = parse_path_id(&user_id)?;
    let family = FamilyService::new(state.service_context())
        .demote_admin(auth.user_id, family_id, user_id)
        .await?;
    Ok(Json(family))
}

/// Rotate the invite code (creator only)
///
/// POST /families/{family_id}/invite-code
pub async fn rotate_invite_code(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(family_id): Path<String>,
) -> ApiResult<Json<FamilyResponse>> {
    let family_id = parse_path_id(&family_id)?;
    let family = FamilyService::new(state.service_context())
        .rotate_invite_code(auth.user_id, family_id)
        .await?;
    Ok(Json(family))
}
