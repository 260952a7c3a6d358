//! Member model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Member record from the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Member {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub date_joined: NaiveDate,
    /// Salted argon2 hash, never serialized to clients
    #[serde(skip_serializing)]
    pub credential_hash: String,
}

impl Member {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Short member representation embedded in loan/reservation listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberSummary {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

/// Member registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterMember {
    #[validate(length(min = 1, max = 50))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub address: Option<String>,
    pub contact: Option<String>,
}
