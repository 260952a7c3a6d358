//! Staff repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::staff::{CreateStaff, Staff, ADMINISTRATOR_ROLE},
};

#[derive(Clone)]
pub struct StaffRepository {
    pool: Pool<Postgres>,
}

impl StaffRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get staff by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Staff> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staffs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("staff {}", id)))
    }

    /// Get staff by email (authentication lookup)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<Staff>> {
        let staff =
            sqlx::query_as::<_, Staff>("SELECT * FROM staffs WHERE LOWER(email) = LOWER($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        Ok(staff)
    }

    /// Check if an email is already enrolled
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM staffs WHERE LOWER(email) = LOWER($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Create a new staff record with a pre-hashed credential
    pub async fn create(&self, staff: &CreateStaff, credential_hash: &str) -> AppResult<Staff> {
        let created = sqlx::query_as::<_, Staff>(
            r#"
            INSERT INTO staffs (first_name, last_name, role, contact, email, credential_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&staff.first_name)
        .bind(&staff.last_name)
        .bind(&staff.role)
        .bind(&staff.contact)
        .bind(&staff.email)
        .bind(credential_hash)
        .fetch_one(&self.pool)
        .await;

        match created {
            Ok(s) => Ok(s),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23505") => {
                Err(AppError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List all staff
    pub async fn list(&self) -> AppResult<Vec<Staff>> {
        let staff =
            sqlx::query_as::<_, Staff>("SELECT * FROM staffs ORDER BY last_name, first_name")
                .fetch_all(&self.pool)
                .await?;

        Ok(staff)
    }

    /// Remove a staff record, refusing to delete the last administrator.
    ///
    /// Locks the administrator rows so two concurrent resignations cannot
    /// both observe a surviving administrator.
    pub async fn remove(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let staff = sqlx::query_as::<_, Staff>("SELECT * FROM staffs WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("staff {}", id)))?;

        if staff.is_administrator() {
            let admins: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM (SELECT id FROM staffs WHERE role = $1 FOR UPDATE) AS locked",
            )
            .bind(ADMINISTRATOR_ROLE)
            .fetch_one(&mut *tx)
            .await?;

            if admins <= 1 {
                return Err(AppError::LastAdministrator);
            }
        }

        sqlx::query("DELETE FROM staffs WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
