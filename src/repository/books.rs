//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("book {}", id)))
    }

    /// Check if an ISBN is already catalogued
    pub async fn isbn_exists(&self, isbn: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// Search the catalog; a query matches title, author or ISBN
    pub async fn search(&self, query: Option<&str>) -> AppResult<Vec<Book>> {
        let books = match query {
            Some(q) if !q.is_empty() => {
                let pattern = format!("%{}%", q);
                sqlx::query_as::<_, Book>(
                    r#"
                    SELECT * FROM books
                    WHERE title ILIKE $1 OR author ILIKE $1 OR isbn ILIKE $1
                    ORDER BY title
                    "#,
                )
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?
            }
            _ => {
                sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(books)
    }

    /// Create a new book
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, publisher, year, isbn, availability, genre)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(book.year)
        .bind(&book.isbn)
        .bind(book.availability)
        .bind(&book.genre)
        .fetch_one(&self.pool)
        .await;

        match created {
            Ok(b) => Ok(b),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23505") => {
                Err(AppError::DuplicateIsbn)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Update a book's record
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $2, author = $3, publisher = $4, year = $5,
                isbn = $6, availability = $7, genre = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(book.year)
        .bind(&book.isbn)
        .bind(book.availability)
        .bind(&book.genre)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {}", id)))
    }

    /// Delete a book; loans and reservations cascade
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let deleted = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("book {}", id)));
        }

        Ok(())
    }
}
