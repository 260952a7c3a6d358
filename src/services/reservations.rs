//! Reservation engine: queuing, cancellation and fulfillment

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::Loan,
        reservation::{Reservation, ReservationDetails},
        session::Session,
    },
    repository::Repository,
};

use super::lending::LendingService;

#[derive(Clone)]
pub struct ReservationsService {
    repository: Repository,
}

impl ReservationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Reserve a book for the session's member.
    ///
    /// Reserving a book that currently has copies available is allowed
    /// (reserve-ahead); only a second pending reservation for the same
    /// (member, book) pair is refused.
    pub async fn reserve(&self, session: &Session, book_id: i32) -> AppResult<Reservation> {
        let member_id = session
            .principal
            .member_id()
            .ok_or(AppError::NotAuthenticated)?;

        self.repository.books.get_by_id(book_id).await?;

        let today = Utc::now().date_naive();
        let reservation = self
            .repository
            .reservations
            .create(member_id, book_id, today)
            .await?;

        tracing::info!(
            "Member {} reserved book {} (reservation {})",
            member_id,
            book_id,
            reservation.id
        );

        Ok(reservation)
    }

    /// Cancel a pending reservation. Any authenticated session may cancel.
    pub async fn cancel(&self, _session: &Session, reservation_id: i32) -> AppResult<Reservation> {
        let cancelled = self.repository.reservations.cancel(reservation_id).await?;

        tracing::info!("Reservation {} cancelled", reservation_id);

        Ok(cancelled)
    }

    /// Fulfill a pending reservation by lending a copy to the reserving
    /// member and confirming the reservation, atomically.
    ///
    /// When no copy is available the reservation stays pending and the
    /// lending error is surfaced to the caller.
    pub async fn fulfill(
        &self,
        _session: &Session,
        reservation_id: i32,
    ) -> AppResult<(Reservation, Loan)> {
        let (loan_date, due_date) = LendingService::loan_term();

        let (reservation, loan) = self
            .repository
            .reservations
            .confirm_with_loan(reservation_id, loan_date, due_date)
            .await?;

        tracing::info!(
            "Reservation {} fulfilled for member {} (loan {})",
            reservation.id,
            reservation.member_id,
            loan.id
        );

        Ok((reservation, loan))
    }

    /// List reservations: staff sees every reservation, a member sees
    /// their own
    pub async fn list_reservations(
        &self,
        session: &Session,
    ) -> AppResult<Vec<ReservationDetails>> {
        match session.principal.member_id() {
            None => self.repository.reservations.list_all().await,
            Some(member_id) => {
                self.repository
                    .reservations
                    .list_for_member(member_id)
                    .await
            }
        }
    }
}
