//! Reservation management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        loan::Loan,
        reservation::{Reservation, ReservationDetails},
    },
};

use super::CurrentSession;

/// Fulfillment response: the confirmed reservation and the loan created
/// for its member
#[derive(Serialize, ToSchema)]
pub struct FulfillResponse {
    pub reservation: Reservation,
    pub loan: Loan,
}

/// List reservations: staff sees every reservation, a member sees their own
#[utoipa::path(
    get,
    path = "/reservations",
    tag = "reservations",
    responses(
        (status = 200, description = "Reservations visible to the session", body = Vec<ReservationDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_reservations(
    State(state): State<crate::AppState>,
    CurrentSession(session): CurrentSession,
) -> AppResult<Json<Vec<ReservationDetails>>> {
    let reservations = state.services.reservations.list_reservations(&session).await?;
    Ok(Json(reservations))
}

/// Cancel a pending reservation
#[utoipa::path(
    post,
    path = "/reservations/{id}/cancel",
    tag = "reservations",
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation cancelled", body = Reservation),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Already resolved")
    )
)]
pub async fn cancel_reservation(
    State(state): State<crate::AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<i32>,
) -> AppResult<Json<Reservation>> {
    let reservation = state.services.reservations.cancel(&session, id).await?;
    Ok(Json(reservation))
}

/// Fulfill a pending reservation, lending a copy to the reserving member
#[utoipa::path(
    post,
    path = "/reservations/{id}/fulfill",
    tag = "reservations",
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 201, description = "Reservation fulfilled", body = FulfillResponse),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Already resolved or no copies available")
    )
)]
pub async fn fulfill_reservation(
    State(state): State<crate::AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<i32>,
) -> AppResult<(StatusCode, Json<FulfillResponse>)> {
    let (reservation, loan) = state.services.reservations.fulfill(&session, id).await?;

    Ok((
        StatusCode::CREATED,
        Json(FulfillResponse { reservation, loan }),
    ))
}
