//! Reservations repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookSummary,
        loan::Loan,
        member::MemberSummary,
        reservation::{Reservation, ReservationDetails, ReservationStatus},
    },
};

#[derive(Clone)]
pub struct ReservationsRepository {
    pool: Pool<Postgres>,
}

impl ReservationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get reservation by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("reservation {}", id)))
    }

    /// Create a pending reservation; at most one pending reservation may
    /// exist per (member, book) pair.
    pub async fn create(
        &self,
        member_id: i32,
        book_id: i32,
        reservation_date: NaiveDate,
    ) -> AppResult<Reservation> {
        let pending_exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM reservations
                WHERE member_id = $1 AND book_id = $2 AND status = 'pending'
            )
            "#,
        )
        .bind(member_id)
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;

        if pending_exists {
            return Err(AppError::DuplicateReservation);
        }

        let created = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (member_id, book_id, reservation_date, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING *
            "#,
        )
        .bind(member_id)
        .bind(book_id)
        .bind(reservation_date)
        .fetch_one(&self.pool)
        .await;

        match created {
            Ok(r) => Ok(r),
            // Partial unique index backstop for a racing duplicate
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23505") => {
                Err(AppError::DuplicateReservation)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Cancel a pending reservation; resolved reservations are immutable
    pub async fn cancel(&self, id: i32) -> AppResult<Reservation> {
        let mut tx = self.pool.begin().await?;

        let reservation = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("reservation {}", id)))?;

        if reservation.status.is_terminal() {
            return Err(AppError::AlreadyResolved);
        }

        let cancelled = sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(ReservationStatus::Cancelled)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(cancelled)
    }

    /// Fulfill a reservation: lend a copy to the reserving member and mark
    /// the reservation confirmed, as one transaction.
    ///
    /// A reservation may not be confirmed unless its loan was actually
    /// created; when no copy is available the whole transaction rolls back
    /// and the reservation stays pending.
    pub async fn confirm_with_loan(
        &self,
        id: i32,
        loan_date: NaiveDate,
        due_date: NaiveDate,
    ) -> AppResult<(Reservation, Loan)> {
        let mut tx = self.pool.begin().await?;

        let reservation = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("reservation {}", id)))?;

        if reservation.status.is_terminal() {
            return Err(AppError::AlreadyResolved);
        }

        let decremented = sqlx::query(
            "UPDATE books SET availability = availability - 1 WHERE id = $1 AND availability > 0",
        )
        .bind(reservation.book_id)
        .execute(&mut *tx)
        .await?;

        if decremented.rows_affected() == 0 {
            return Err(AppError::NotAvailable);
        }

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (member_id, book_id, loan_date, due_date, fine)
            VALUES ($1, $2, $3, $4, 0)
            RETURNING *
            "#,
        )
        .bind(reservation.member_id)
        .bind(reservation.book_id)
        .bind(loan_date)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await?;

        let confirmed = sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(ReservationStatus::Confirmed)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((confirmed, loan))
    }

    /// List all reservations, most recent first
    pub async fn list_all(&self) -> AppResult<Vec<ReservationDetails>> {
        let rows = sqlx::query(&Self::details_query(None))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(Self::map_details).collect())
    }

    /// List a member's reservations, most recent first
    pub async fn list_for_member(&self, member_id: i32) -> AppResult<Vec<ReservationDetails>> {
        let rows = sqlx::query(&Self::details_query(Some("r.member_id = $1")))
            .bind(member_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(Self::map_details).collect())
    }

    fn details_query(filter: Option<&str>) -> String {
        let mut query = String::from(
            r#"
            SELECT r.id, r.reservation_date, r.status,
                   b.id AS book_id, b.title, b.author, b.isbn,
                   m.id AS member_id, m.first_name, m.last_name
            FROM reservations r
            JOIN books b ON r.book_id = b.id
            JOIN members m ON r.member_id = m.id
            "#,
        );
        if let Some(filter) = filter {
            query.push_str(&format!("WHERE {}\n", filter));
        }
        query.push_str("ORDER BY r.reservation_date DESC, r.id DESC");
        query
    }

    fn map_details(row: &sqlx::postgres::PgRow) -> ReservationDetails {
        ReservationDetails {
            id: row.get("id"),
            reservation_date: row.get("reservation_date"),
            status: row.get("status"),
            book: BookSummary {
                id: row.get("book_id"),
                title: row.get("title"),
                author: row.get("author"),
                isbn: row.get("isbn"),
            },
            member: MemberSummary {
                id: row.get("member_id"),
                first_name: row.get("first_name"),
                last_name: row.get("last_name"),
            },
        }
    }
}
