//! Data models for Athenaeum

pub mod book;
pub mod loan;
pub mod member;
pub mod reservation;
pub mod session;
pub mod staff;

// Re-export commonly used types
pub use book::{Book, BookSummary};
pub use loan::{Loan, LoanDetails};
pub use member::{Member, MemberSummary};
pub use reservation::{Reservation, ReservationDetails, ReservationStatus};
pub use session::{Principal, Session};
pub use staff::Staff;
