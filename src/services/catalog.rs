//! Catalog management service

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    repository::Repository,
};

static ISBN_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("static ISBN pattern is valid"));

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search the catalog; the query matches title, author or ISBN
    pub async fn search_books(&self, query: Option<&str>) -> AppResult<Vec<Book>> {
        self.repository.books.search(query).await
    }

    /// Get book by ID
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Add a book to the catalog with ISBN validation and deduplication
    pub async fn add_book(&self, book: CreateBook) -> AppResult<Book> {
        validate_isbn(&book.isbn)?;

        if book.availability < 0 {
            return Err(AppError::Validation(
                "availability cannot be negative".to_string(),
            ));
        }

        if self.repository.books.isbn_exists(&book.isbn).await? {
            return Err(AppError::DuplicateIsbn);
        }

        let created = self.repository.books.create(&book).await?;

        tracing::info!("Book {} added: {}", created.id, created.title);

        Ok(created)
    }

    /// Update a book's record
    pub async fn update_book(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        if book.availability < 0 {
            return Err(AppError::Validation(
                "availability cannot be negative".to_string(),
            ));
        }

        self.repository.books.update(id, &book).await
    }

    /// Remove a book from the catalog
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;

        tracing::info!("Book {} deleted", id);

        Ok(())
    }
}

fn validate_isbn(isbn: &str) -> AppResult<()> {
    if !ISBN_DIGITS.is_match(isbn) {
        return Err(AppError::InvalidIsbn(isbn.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_isbns_pass() {
        assert!(validate_isbn("9780000000002").is_ok());
        assert!(validate_isbn("1234567891").is_ok());
    }

    #[test]
    fn non_numeric_isbns_fail() {
        assert!(matches!(
            validate_isbn("978-0-00-000000-2"),
            Err(AppError::InvalidIsbn(_))
        ));
        assert!(matches!(validate_isbn(""), Err(AppError::InvalidIsbn(_))));
        assert!(matches!(
            validate_isbn("97800000ABC"),
            Err(AppError::InvalidIsbn(_))
        ));
    }
}
