use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{present, LoginRequest, MessageResponse, SignupRequest, TokenResponse},
        services,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let Json(body) = payload?;
    services::signup(
        state.store.as_ref(),
        present(&body.username),
        present(&body.password),
        present(&body.role),
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created successfully",
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(body) = payload?;
    let token = services::login(
        state.store.as_ref(),
        &state.keys,
        present(&body.username),
        present(&body.password),
    )
    .await?;
    Ok(Json(TokenResponse { token }))
}
