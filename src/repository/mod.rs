//! Repository layer for database operations

pub mod books;
pub mod loans;
pub mod members;
pub mod reservations;
pub mod staff;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub members: members::MembersRepository,
    pub staff: staff::StaffRepository,
    pub books: books::BooksRepository,
    pub loans: loans::LoansRepository,
    pub reservations: reservations::ReservationsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            members: members::MembersRepository::new(pool.clone()),
            staff: staff::StaffRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            reservations: reservations::ReservationsRepository::new(pool.clone()),
            pool,
        }
    }
}
