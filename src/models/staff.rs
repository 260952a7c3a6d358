//! Staff model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Distinguished role value; the roster must always retain at least one
pub const ADMINISTRATOR_ROLE: &str = "Administrator";

/// Staff record from the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Staff {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    /// Free-form role; "Administrator" is distinguished
    pub role: String,
    pub contact: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub credential_hash: String,
}

impl Staff {
    pub fn display_name(&self) -> String {
        format!("{} {} [{}]", self.first_name, self.last_name, self.role)
    }

    pub fn is_administrator(&self) -> bool {
        self.role == ADMINISTRATOR_ROLE
    }
}

/// Staff enrollment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStaff {
    #[validate(length(min = 1, max = 50))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50))]
    pub last_name: String,
    #[validate(length(min = 1, max = 50))]
    pub role: String,
    pub contact: Option<String>,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}
