use tracing::{info, warn};

use super::{
    jwt::JwtKeys,
    password::{hash_password_blocking, verify_password_blocking, DUMMY_HASH},
};
use crate::{
    error::AppError,
    store::{CredentialStore, Role, User},
};

/// Hashes the password and persists a new user. Duplicate usernames surface as
/// `Conflict` from the store's unique constraint.
pub async fn signup(
    store: &dyn CredentialStore,
    username: Option<&str>,
    password: Option<&str>,
    role: Option<&str>,
) -> Result<User, AppError> {
    let (Some(username), Some(password), Some(role)) = (username, password, role) else {
        warn!("signup missing fields");
        return Err(AppError::bad_request("Missing username, password, or role"));
    };
    let role: Role = role.parse().map_err(|_| {
        warn!(%role, "signup invalid role");
        AppError::bad_request("Invalid role")
    })?;

    let hash = hash_password_blocking(password.to_string()).await?;
    let user = store.create_user(username, &hash, role).await.map_err(|e| {
        warn!(%username, error = %e, "signup rejected");
        AppError::from(e)
    })?;

    info!(user_id = %user.id, username = %user.username, role = %user.role, "user signed up");
    Ok(user)
}

/// Checks credentials and issues a token carrying `{username, role}`.
/// Unknown usernames and wrong passwords are indistinguishable to the caller.
pub async fn login(
    store: &dyn CredentialStore,
    keys: &JwtKeys,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<String, AppError> {
    let (Some(username), Some(password)) = (username, password) else {
        warn!("login missing fields");
        return Err(AppError::bad_request("Missing username or password"));
    };

    let Some(user) = store.find_user_by_username(username).await? else {
        verify_password_blocking(password.to_string(), DUMMY_HASH.to_string()).await?;
        warn!(%username, "login unknown username");
        return Err(AppError::unauthorized("Invalid credentials"));
    };

    let ok = verify_password_blocking(password.to_string(), user.password_hash.clone()).await?;
    if !ok {
        warn!(%username, user_id = %user.id, "login invalid password");
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let token = keys.sign(&user.username, user.role)?;
    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(token)
}
