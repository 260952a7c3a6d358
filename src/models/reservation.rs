//! Reservation model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::BookSummary;
use super::member::MemberSummary;

/// Reservation lifecycle state.
///
/// `Confirmed` and `Cancelled` are terminal; a resolved reservation never
/// transitions again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "reservation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReservationStatus::Confirmed | ReservationStatus::Cancelled)
    }
}

/// Reservation record from the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reservation {
    pub id: i32,
    pub member_id: i32,
    pub book_id: i32,
    pub reservation_date: NaiveDate,
    pub status: ReservationStatus,
}

/// Reservation with joined book and member details for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationDetails {
    pub id: i32,
    pub reservation_date: NaiveDate,
    pub status: ReservationStatus,
    pub book: BookSummary,
    pub member: MemberSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_is_non_terminal() {
        assert!(!ReservationStatus::Pending.is_terminal());
        assert!(ReservationStatus::Confirmed.is_terminal());
        assert!(ReservationStatus::Cancelled.is_terminal());
    }
}
