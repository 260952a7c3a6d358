//! Loan management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::loan::{Loan, LoanDetails},
};

use super::CurrentSession;

/// Return response with the closed loan and its fine
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    pub status: String,
    pub loan: Loan,
}

/// List loans: staff sees every loan, a member sees their own
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    responses(
        (status = 200, description = "Loans visible to the session", body = Vec<LoanDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    CurrentSession(session): CurrentSession,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.lending.list_loans(&session).await?;
    Ok(Json(loans))
}

/// Return a borrowed copy
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Copy returned", body = ReturnResponse),
        (status = 403, description = "Loan belongs to another member"),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    CurrentSession(session): CurrentSession,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<ReturnResponse>> {
    let loan = state.services.lending.return_loan(&session, loan_id).await?;

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
        loan,
    }))
}
