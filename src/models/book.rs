//! Book (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Book record from the database.
///
/// `availability` counts the copies not currently on loan; the lending
/// engine is the only writer during borrow/return and keeps it non-negative.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub isbn: String,
    pub availability: i32,
    pub genre: Option<String>,
}

/// Short book representation embedded in loan/reservation listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
}

/// Catalog search parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BookQuery {
    /// Substring matched against title, author and ISBN
    pub q: Option<String>,
}

/// New book request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub isbn: String,
    #[serde(default)]
    pub availability: i32,
    pub genre: Option<String>,
}

/// Book update request; all bibliographic fields are replaced
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBook {
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub isbn: String,
    pub availability: i32,
    pub genre: Option<String>,
}
