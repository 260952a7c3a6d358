//! Member registration and lifecycle service

use chrono::Utc;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::member::{Member, RegisterMember},
    repository::Repository,
};

use super::auth::hash_credential;

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
}

impl MembersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new member
    pub async fn register(&self, registration: RegisterMember) -> AppResult<Member> {
        registration.validate()?;

        if self
            .repository
            .members
            .email_exists(&registration.email)
            .await?
        {
            return Err(AppError::DuplicateEmail);
        }

        let credential_hash = hash_credential(&registration.password)?;
        let date_joined = Utc::now().date_naive();

        let member = self
            .repository
            .members
            .create(&registration, &credential_hash, date_joined)
            .await?;

        tracing::info!("Member {} registered ({})", member.id, member.email);

        Ok(member)
    }

    /// Get a member by ID
    pub async fn get(&self, member_id: i32) -> AppResult<Member> {
        self.repository.members.get_by_id(member_id).await
    }

    /// List all members
    pub async fn list(&self) -> AppResult<Vec<Member>> {
        self.repository.members.list().await
    }

    /// Remove a member; fails while they hold an open loan or a pending
    /// reservation
    pub async fn remove(&self, member_id: i32) -> AppResult<()> {
        self.repository.members.remove(member_id).await?;

        tracing::info!("Member {} removed", member_id);

        Ok(())
    }
}
