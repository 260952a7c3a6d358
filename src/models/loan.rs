//! Loan (borrow) model and related types

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::BookSummary;
use super::member::MemberSummary;

/// Loan record from the database.
///
/// A loan with `return_date` set is closed and never mutated again.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub member_id: i32,
    pub book_id: i32,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    #[schema(value_type = String)]
    pub fine: Decimal,
}

impl Loan {
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }
}

/// Loan with joined book and member details for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    #[schema(value_type = String)]
    pub fine: Decimal,
    pub is_overdue: bool,
    pub book: BookSummary,
    pub member: MemberSummary,
}
