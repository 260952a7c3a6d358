//! Catalog and lending entry endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookQuery, CreateBook, UpdateBook},
        loan::Loan,
        reservation::Reservation,
    },
};

use super::CurrentSession;

/// Browse or search the catalog
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.search_books(query.q.as_deref()).await?;
    Ok(Json(books))
}

/// Get a single book
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "The book", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book added", body = Book),
        (status = 400, description = "Invalid ISBN"),
        (status = 409, description = "ISBN already catalogued")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    CurrentSession(_session): CurrentSession,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.catalog.add_book(request).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book's record
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    CurrentSession(_session): CurrentSession,
    Path(id): Path<i32>,
    Json(request): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.update_book(id, request).await?;
    Ok(Json(book))
}

/// Remove a book from the catalog
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book removed"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    CurrentSession(_session): CurrentSession,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Borrow one copy of a book
#[utoipa::path(
    post,
    path = "/books/{id}/borrow",
    tag = "loans",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "No copies available")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<i32>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    let loan = state.services.lending.borrow(&session, id).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Reserve a book
#[utoipa::path(
    post,
    path = "/books/{id}/reserve",
    tag = "reservations",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 201, description = "Reservation created", body = Reservation),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Already reserved")
    )
)]
pub async fn reserve_book(
    State(state): State<crate::AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<i32>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    let reservation = state.services.reservations.reserve(&session, id).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}
