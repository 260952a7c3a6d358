//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, loans, members, reservations, staff};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Athenaeum API",
        version = "0.3.0",
        description = "Library lending and reservation REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::logout,
        auth::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::borrow_book,
        books::reserve_book,
        // Loans
        loans::list_loans,
        loans::return_loan,
        // Reservations
        reservations::list_reservations,
        reservations::cancel_reservation,
        reservations::fulfill_reservation,
        // Members
        members::register,
        members::list_members,
        members::remove_member,
        // Staff
        staff::list_staff,
        staff::enroll_staff,
        staff::resign_staff,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::SessionInfo,
            crate::services::auth::LoginPortal,
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            loans::ReturnResponse,
            // Reservations
            crate::models::reservation::Reservation,
            crate::models::reservation::ReservationDetails,
            crate::models::reservation::ReservationStatus,
            reservations::FulfillResponse,
            // Members
            crate::models::member::Member,
            crate::models::member::MemberSummary,
            crate::models::member::RegisterMember,
            // Staff
            crate::models::staff::Staff,
            crate::models::staff::CreateStaff,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication and sessions"),
        (name = "books", description = "Catalog management"),
        (name = "loans", description = "Lending lifecycle"),
        (name = "reservations", description = "Reservation lifecycle"),
        (name = "members", description = "Member management"),
        (name = "staff", description = "Staff management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
