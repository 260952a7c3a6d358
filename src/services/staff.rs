//! Staff enrollment and lifecycle service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::staff::{CreateStaff, Staff},
    repository::Repository,
};

use super::auth::hash_credential;

#[derive(Clone)]
pub struct StaffService {
    repository: Repository,
}

impl StaffService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Enroll a new staff record
    pub async fn enroll(&self, staff: CreateStaff) -> AppResult<Staff> {
        staff.validate()?;

        if self.repository.staff.email_exists(&staff.email).await? {
            return Err(AppError::DuplicateEmail);
        }

        let credential_hash = hash_credential(&staff.password)?;
        let created = self.repository.staff.create(&staff, &credential_hash).await?;

        tracing::info!("Staff {} enrolled as {}", created.id, created.role);

        Ok(created)
    }

    /// List all staff
    pub async fn list(&self) -> AppResult<Vec<Staff>> {
        self.repository.staff.list().await
    }

    /// Remove a staff record; the roster must retain at least one
    /// administrator
    pub async fn resign(&self, staff_id: i32) -> AppResult<()> {
        self.repository.staff.remove(staff_id).await?;

        tracing::info!("Staff {} resigned", staff_id);

        Ok(())
    }
}
