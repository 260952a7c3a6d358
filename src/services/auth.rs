//! Authentication and session management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use rand::RngCore;
use serde::Deserialize;
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::session::{Principal, Session},
    repository::Repository,
};

/// Credential pool selected at login: members and staff authenticate
/// against separate records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoginPortal {
    Member,
    Staff,
}

/// In-process store of live sessions, keyed by opaque token.
///
/// Sessions never reach the durable store; dropping the map (or the
/// process) ends every session.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    fn insert(&self, session: Session) {
        self.inner
            .write()
            .expect("session store poisoned")
            .insert(session.token.clone(), session);
    }

    fn get(&self, token: &str) -> Option<Session> {
        self.inner
            .read()
            .expect("session store poisoned")
            .get(token)
            .cloned()
    }

    fn remove(&self, token: &str) {
        self.inner
            .write()
            .expect("session store poisoned")
            .remove(token);
    }
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
    sessions: SessionStore,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self {
            repository,
            config,
            sessions: SessionStore::default(),
        }
    }

    /// Authenticate against the portal's credential pool and open a session.
    ///
    /// A lookup miss and a credential mismatch return the same error so the
    /// response does not reveal which emails are registered.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        portal: LoginPortal,
    ) -> AppResult<Session> {
        let (principal, display_name, credential_hash) = match portal {
            LoginPortal::Member => {
                let member = self
                    .repository
                    .members
                    .get_by_email(email)
                    .await?
                    .ok_or(AppError::InvalidCredentials)?;
                let display_name = member.display_name();
                (
                    Principal::Member { id: member.id },
                    display_name,
                    member.credential_hash,
                )
            }
            LoginPortal::Staff => {
                let staff = self
                    .repository
                    .staff
                    .get_by_email(email)
                    .await?
                    .ok_or(AppError::InvalidCredentials)?;
                let display_name = staff.display_name();
                (
                    Principal::Staff {
                        id: staff.id,
                        role: staff.role.clone(),
                    },
                    display_name,
                    staff.credential_hash,
                )
            }
        };

        if !verify_credential(&credential_hash, password)? {
            return Err(AppError::InvalidCredentials);
        }

        let session = Session {
            token: generate_token(),
            principal,
            display_name,
            created_at: Utc::now(),
        };
        self.sessions.insert(session.clone());

        tracing::info!("Session opened for {}", session.display_name);

        Ok(session)
    }

    /// Resolve an opaque token to its session; anonymous (None) for
    /// unknown or expired tokens, never an error
    pub fn resolve(&self, token: &str) -> Option<Session> {
        let session = self.sessions.get(token)?;

        if expired(&session, Duration::hours(self.config.session_ttl_hours as i64)) {
            self.sessions.remove(token);
            return None;
        }

        Some(session)
    }

    /// End a session; ending an already-ended session is a no-op
    pub fn end(&self, token: &str) {
        self.sessions.remove(token);
    }
}

fn expired(session: &Session, ttl: Duration) -> bool {
    Utc::now() - session.created_at > ttl
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a credential with a fresh random salt
pub fn hash_credential(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash credential: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash; the comparison inside the
/// hashing primitive is constant-time
pub fn verify_credential(hash: &str, password: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Stored credential hash is malformed".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(token: &str) -> Session {
        Session {
            token: token.to_string(),
            principal: Principal::Member { id: 1 },
            display_name: "Ada Lovelace".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn store_roundtrip_and_idempotent_end() {
        let store = SessionStore::default();
        store.insert(session("tok"));

        assert!(store.get("tok").is_some());
        assert!(store.get("other").is_none());

        store.remove("tok");
        assert!(store.get("tok").is_none());

        // Ending an already-ended session must not panic or error
        store.remove("tok");
    }

    #[test]
    fn sessions_expire_after_ttl() {
        let mut old = session("old");
        old.created_at = Utc::now() - Duration::hours(25);

        assert!(expired(&old, Duration::hours(24)));
        assert!(!expired(&session("fresh"), Duration::hours(24)));
    }

    #[test]
    fn tokens_are_long_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }

    #[test]
    fn credential_hash_verifies_and_rejects() {
        let hash = hash_credential("correct horse").unwrap();
        assert!(verify_credential(&hash, "correct horse").unwrap());
        assert!(!verify_credential(&hash, "battery staple").unwrap());
    }
}
