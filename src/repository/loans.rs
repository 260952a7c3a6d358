//! Loans repository for database operations

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookSummary,
        loan::{Loan, LoanDetails},
        member::MemberSummary,
    },
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("loan {}", id)))
    }

    /// Create a loan, taking one copy off the shelf.
    ///
    /// The availability decrement is a conditional update inside the same
    /// transaction as the insert: two concurrent borrows of the last copy
    /// serialize on the book row and only one decrement can succeed.
    pub async fn create(
        &self,
        member_id: i32,
        book_id: i32,
        loan_date: NaiveDate,
        due_date: NaiveDate,
    ) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let decremented = sqlx::query(
            "UPDATE books SET availability = availability - 1 WHERE id = $1 AND availability > 0",
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        if decremented.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                    .bind(book_id)
                    .fetch_one(&mut *tx)
                    .await?;

            return Err(if exists {
                AppError::NotAvailable
            } else {
                AppError::NotFound(format!("book {}", book_id))
            });
        }

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (member_id, book_id, loan_date, due_date, fine)
            VALUES ($1, $2, $3, $4, 0)
            RETURNING *
            "#,
        )
        .bind(member_id)
        .bind(book_id)
        .bind(loan_date)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(loan)
    }

    /// Close a loan and put the copy back on the shelf.
    ///
    /// The update is guarded on `return_date IS NULL`; a racing double
    /// return finds no open row and fails with `AlreadyReturned` without
    /// touching the fine or the availability a second time.
    pub async fn close(
        &self,
        loan_id: i32,
        return_date: NaiveDate,
        fine: Decimal,
    ) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans SET return_date = $2, fine = $3
            WHERE id = $1 AND return_date IS NULL
            RETURNING *
            "#,
        )
        .bind(loan_id)
        .bind(return_date)
        .bind(fine)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::AlreadyReturned)?;

        sqlx::query("UPDATE books SET availability = availability + 1 WHERE id = $1")
            .bind(loan.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(loan)
    }

    /// List all loans, most recent first
    pub async fn list_all(&self) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query(&Self::details_query(None))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(Self::map_details).collect())
    }

    /// List a member's loans, most recent first
    pub async fn list_for_member(&self, member_id: i32) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query(&Self::details_query(Some("l.member_id = $1")))
            .bind(member_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(Self::map_details).collect())
    }

    fn details_query(filter: Option<&str>) -> String {
        let mut query = String::from(
            r#"
            SELECT l.id, l.loan_date, l.due_date, l.return_date, l.fine,
                   b.id AS book_id, b.title, b.author, b.isbn,
                   m.id AS member_id, m.first_name, m.last_name
            FROM loans l
            JOIN books b ON l.book_id = b.id
            JOIN members m ON l.member_id = m.id
            "#,
        );
        if let Some(filter) = filter {
            query.push_str(&format!("WHERE {}\n", filter));
        }
        query.push_str("ORDER BY l.loan_date DESC, l.id DESC");
        query
    }

    fn map_details(row: &sqlx::postgres::PgRow) -> LoanDetails {
        let due_date: NaiveDate = row.get("due_date");
        let return_date: Option<NaiveDate> = row.get("return_date");
        let today = Utc::now().date_naive();

        LoanDetails {
            id: row.get("id"),
            loan_date: row.get("loan_date"),
            due_date,
            return_date,
            fine: row.get("fine"),
            is_overdue: return_date.is_none() && due_date < today,
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
