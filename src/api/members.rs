//! Member registration and management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::member::{Member, RegisterMember},
};

use super::CurrentSession;

/// Register a new member
#[utoipa::path(
    post,
    path = "/members/register",
    tag = "members",
    request_body = RegisterMember,
    responses(
        (status = 201, description = "Member registered", body = Member),
        (status = 400, description = "Invalid registration"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterMember>,
) -> AppResult<(StatusCode, Json<Member>)> {
    let member = state.services.members.register(request).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// List all members
#[utoipa::path(
    get,
    path = "/members",
    tag = "members",
    responses(
        (status = 200, description = "All members", body = Vec<Member>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_members(
    State(state): State<crate::AppState>,
    CurrentSession(_session): CurrentSession,
) -> AppResult<Json<Vec<Member>>> {
    let members = state.services.members.list().await?;
    Ok(Json(members))
}

/// Remove a member without open obligations
#[utoipa::path(
    delete,
    path = "/members/{id}",
    tag = "members",
    params(("id" = i32, Path, description = "Member ID")),
    responses(
        (status = 204, description = "Member removed"),
        (status = 404, description = "Member not found"),
        (status = 409, description = "Member has open loans or reservations")
    )
)]
pub async fn remove_member(
    State(state): State<crate::AppState>,
    CurrentSession(_session): CurrentSession,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.members.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
