//! API handlers for Athenaeum REST endpoints

pub mod auth;
pub mod books;
pub mod health;
pub mod loans;
pub mod members;
pub mod openapi;
pub mod reservations;
pub mod staff;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;

use crate::{error::AppError, models::session::Session, AppState};

/// Cookie carrying the opaque session token
pub const SESSION_COOKIE: &str = "athenaeum_session";

/// Extractor for the authenticated session.
///
/// Extraction is the authentication gate: a handler taking
/// `CurrentSession` never runs for an anonymous request, the request is
/// rejected with `NotAuthenticated` first.
pub struct CurrentSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let token = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .ok_or(AppError::NotAuthenticated)?;

        let session = state
            .services
            .auth
            .resolve(&token)
            .ok_or(AppError::NotAuthenticated)?;

        Ok(CurrentSession(session))
    }
}
