//! Authorization guard.
//!
//! Every protected handler takes either [`CurrentStudent`] or [`CurrentTeacher`].
//! Both resolve the bearer token to a live [`User`] through [`authorize`], so there is
//! one place where identity is reconstructed and roles are checked.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use crate::{
    error::AppError,
    state::AppState,
    store::{Role, User},
};

const MISSING_CREDENTIAL: &str = "Missing Authorization Header";
const INVALID_CREDENTIAL: &str = "Invalid token";

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized(MISSING_CREDENTIAL))?;
    let value = header
        .to_str()
        .map_err(|_| AppError::unauthorized(INVALID_CREDENTIAL))?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIAL))
}

/// Token → claims → current user → role check.
pub async fn authorize(parts: &Parts, state: &AppState, required: Role) -> Result<User, AppError> {
    let token = bearer_token(parts)?;

    let claims = state.keys.verify(token).map_err(|_| {
        warn!("invalid token");
        AppError::unauthorized(INVALID_CREDENTIAL)
    })?;

    let user = state
        .store
        .find_user_by_username(&claims.username)
        .await?
        .ok_or_else(|| {
            warn!(username = %claims.username, "token references unknown user");
            AppError::unauthorized(INVALID_CREDENTIAL)
        })?;

    // The stored role is authoritative; the role claim is informational.
    if user.role != required {
        warn!(username = %user.username, role = %user.role, required = %required, "role mismatch");
        return Err(AppError::Forbidden);
    }

    Ok(user)
}

/// Authenticated user with the student role.
#[derive(Debug, Clone)]
pub struct CurrentStudent(pub User);

/// Authenticated user with the teacher role.
#[derive(Debug, Clone)]
pub struct CurrentTeacher(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentStudent {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authorize(parts, state, Role::Student).await.map(Self)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentTeacher {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authorize(parts, state, Role::Teacher).await.map(Self)
    }
}
