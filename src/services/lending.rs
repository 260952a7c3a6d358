//! Lending engine: borrowing, returns and overdue fines

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{
        loan::{Loan, LoanDetails},
        session::Session,
    },
    repository::Repository,
};

/// Loan period granted on borrow
const LOAN_PERIOD_DAYS: i64 = 14;

/// Fine accrued per day past the due date, in cents.
/// Fixed policy; external fine reports depend on it staying exact.
const FINE_PER_DAY_CENTS: i64 = 50;

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
    config: LendingConfig,
}

impl LendingService {
    pub fn new(repository: Repository, config: LendingConfig) -> Self {
        Self { repository, config }
    }

    /// Loan and due dates for a loan starting today
    pub(crate) fn loan_term() -> (NaiveDate, NaiveDate) {
        let today = Utc::now().date_naive();
        (today, today + Duration::days(LOAN_PERIOD_DAYS))
    }

    /// Borrow one copy of a book for the session's member.
    ///
    /// The availability check-and-decrement and the loan insert are one
    /// transaction in the repository; of N concurrent borrows of the last
    /// copy exactly one succeeds.
    pub async fn borrow(&self, session: &Session, book_id: i32) -> AppResult<Loan> {
        // A staff session carries no member identity to lend to
        let member_id = session
            .principal
            .member_id()
            .ok_or(AppError::NotAuthenticated)?;

        let (loan_date, due_date) = Self::loan_term();
        let loan = self
            .repository
            .loans
            .create(member_id, book_id, loan_date, due_date)
            .await?;

        tracing::info!(
            "Member {} borrowed book {} (loan {}, due {})",
            member_id,
            book_id,
            loan.id,
            loan.due_date
        );

        Ok(loan)
    }

    /// Return a borrowed copy, computing the overdue fine.
    ///
    /// Members may only return their own loans while the ownership policy
    /// is enforced; staff may return on any member's behalf.
    pub async fn return_loan(&self, session: &Session, loan_id: i32) -> AppResult<Loan> {
        let loan = self.repository.loans.get_by_id(loan_id).await?;

        if !loan.is_open() {
            return Err(AppError::AlreadyReturned);
        }

        if self.config.enforce_return_ownership
            && !session.principal.is_staff()
            && session.principal.member_id() != Some(loan.member_id)
        {
            return Err(AppError::NotOwner);
        }

        let today = Utc::now().date_naive();
        let fine = overdue_fine(loan.due_date, today);

        let closed = self.repository.loans.close(loan_id, today, fine).await?;

        tracing::info!("Loan {} returned (fine {})", loan_id, closed.fine);

        Ok(closed)
    }

    /// List loans: staff sees every loan, a member sees their own
    pub async fn list_loans(&self, session: &Session) -> AppResult<Vec<LoanDetails>> {
        match session.principal.member_id() {
            None => self.repository.loans.list_all().await,
            Some(member_id) => self.repository.loans.list_for_member(member_id).await,
        }
    }
}

/// Fine owed for a loan returned past its due date, a pure function of the
/// two dates: $0.50 per full day late, zero otherwise.
pub fn overdue_fine(due_date: NaiveDate, return_date: NaiveDate) -> Decimal {
    let days_overdue = (return_date - due_date).num_days();
    if days_overdue <= 0 {
        return Decimal::ZERO;
    }
    Decimal::new(days_overdue * FINE_PER_DAY_CENTS, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn five_days_late_costs_two_fifty() {
        // loan 2024-01-01, due 2024-01-15, returned 2024-01-20
        let fine = overdue_fine(date(2024, 1, 15), date(2024, 1, 20));
        assert_eq!(fine, Decimal::new(250, 2));
    }

    #[test]
    fn on_time_returns_are_free() {
        assert_eq!(overdue_fine(date(2024, 1, 15), date(2024, 1, 15)), Decimal::ZERO);
        assert_eq!(overdue_fine(date(2024, 1, 15), date(2024, 1, 10)), Decimal::ZERO);
    }

    #[test]
    fn one_day_late_costs_fifty_cents() {
        let fine = overdue_fine(date(2024, 1, 15), date(2024, 1, 16));
        assert_eq!(fine, Decimal::new(50, 2));
    }

    #[test]
    fn fine_scale_is_two_decimal_places() {
        let fine = overdue_fine(date(2024, 1, 15), date(2024, 2, 15));
        assert_eq!(fine.scale(), 2);
        assert_eq!(fine, Decimal::new(1550, 2));
    }
}
