//! Staff management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::staff::{CreateStaff, Staff},
};

use super::CurrentSession;

/// List all staff
#[utoipa::path(
    get,
    path = "/staff",
    tag = "staff",
    responses(
        (status = 200, description = "All staff", body = Vec<Staff>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_staff(
    State(state): State<crate::AppState>,
    CurrentSession(_session): CurrentSession,
) -> AppResult<Json<Vec<Staff>>> {
    let staff = state.services.staff.list().await?;
    Ok(Json(staff))
}

/// Enroll a new staff record
#[utoipa::path(
    post,
    path = "/staff",
    tag = "staff",
    request_body = CreateStaff,
    responses(
        (status = 201, description = "Staff enrolled", body = Staff),
        (status = 409, description = "Email already enrolled")
    )
)]
pub async fn enroll_staff(
    State(state): State<crate::AppState>,
    CurrentSession(_session): CurrentSession,
    Json(request): Json<CreateStaff>,
) -> AppResult<(StatusCode, Json<Staff>)> {
    let staff = state.services.staff.enroll(request).await?;
    Ok((StatusCode::CREATED, Json(staff)))
}

/// Remove a staff record; the last administrator cannot resign
#[utoipa::path(
    delete,
    path = "/staff/{id}",
    tag = "staff",
    params(("id" = i32, Path, description = "Staff ID")),
    responses(
        (status = 204, description = "Staff removed"),
        (status = 404, description = "Staff not found"),
        (status = 409, description = "Last administrator")
    )
)]
pub async fn resign_staff(
    State(state): State<crate::AppState>,
    CurrentSession(_session): CurrentSession,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.staff.resign(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
