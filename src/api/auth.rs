//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppResult, models::session::Session, services::auth::LoginPortal};

use super::{CurrentSession, SESSION_COOKIE};

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Which credential pool to authenticate against
    pub portal: LoginPortal,
}

/// Login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// Opaque session token, also set as an HttpOnly cookie
    pub token: String,
    pub session: SessionInfo,
}

/// Session principal as shown to clients
#[derive(Serialize, ToSchema)]
pub struct SessionInfo {
    pub display_name: String,
    pub is_staff: bool,
    pub is_admin: bool,
}

impl From<&Session> for SessionInfo {
    fn from(session: &Session) -> Self {
        Self {
            display_name: session.display_name.clone(),
            is_staff: session.principal.is_staff(),
            is_admin: session.principal.is_admin(),
        }
    }
}

/// Authenticate and open a session
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let session = state
        .services
        .auth
        .login(&request.email, &request.password, request.portal)
        .await?;

    let cookie = Cookie::build((SESSION_COOKIE, session.token.clone()))
        .path("/")
        .http_only(true)
        .build();

    let info = SessionInfo::from(&session);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            token: session.token,
            session: info,
        }),
    ))
}

/// End the current session; ending an already-ended session succeeds
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 204, description = "Session ended")
    )
)]
pub async fn logout(
    State(state): State<crate::AppState>,
    jar: CookieJar,
) -> (CookieJar, StatusCode) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.services.auth.end(cookie.value());
    }

    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");

    (jar.remove(removal), StatusCode::NO_CONTENT)
}

/// Current session principal
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current principal", body = SessionInfo),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(CurrentSession(session): CurrentSession) -> Json<SessionInfo> {
    Json(SessionInfo::from(&session))
}
