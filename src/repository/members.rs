//! Members repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::member::{Member, RegisterMember},
};

#[derive(Clone)]
pub struct MembersRepository {
    pool: Pool<Postgres>,
}

impl MembersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get member by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Member> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("member {}", id)))
    }

    /// Get member by email (authentication lookup)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(
            "SELECT * FROM members WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    /// Check if an email is already registered
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM members WHERE LOWER(email) = LOWER($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Create a new member with a pre-hashed credential
    pub async fn create(
        &self,
        member: &RegisterMember,
        credential_hash: &str,
        date_joined: NaiveDate,
    ) -> AppResult<Member> {
        let created = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (first_name, last_name, email, address, contact, date_joined, credential_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(&member.email)
        .bind(&member.address)
        .bind(&member.contact)
        .bind(date_joined)
        .bind(credential_hash)
        .fetch_one(&self.pool)
        .await;

        match created {
            Ok(m) => Ok(m),
            // Unique index backstop for a racing duplicate registration
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23505") => {
                Err(AppError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List all members
    pub async fn list(&self) -> AppResult<Vec<Member>> {
        let members =
            sqlx::query_as::<_, Member>("SELECT * FROM members ORDER BY last_name, first_name")
                .fetch_all(&self.pool)
                .await?;

        Ok(members)
    }

    /// Remove a member, failing while any open obligation exists.
    /// Obligation check and delete run in one transaction.
    pub async fn remove(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        if !exists {
            return Err(AppError::NotFound(format!("member {}", id)));
        }

        let has_obligations: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM reservations WHERE member_id = $1 AND status = 'pending')
                OR EXISTS(SELECT 1 FROM loans WHERE member_id = $1 AND return_date IS NULL)
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if has_obligations {
            return Err(AppError::HasOpenObligations);
        }

        sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
