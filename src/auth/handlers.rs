use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument};

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, SignupRequest, TokenResponse},
        error::AuthError,
        jwt::AuthUser,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<PublicUser>), AuthError> {
    let user = state.auth.signup(payload).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let token = state.auth.login(payload).await?;
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let user = state
        .users
        .find_by_id(user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id, "find_by_id failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        })?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    Ok(Json(user.into()))
}
