//! Registration, login and the current account.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use styleyoung_core::input::Registration;
use styleyoung_core::User;
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(form): Json<Registration>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    form.validate()?;

    let password_hash = hash_password(&form.password)?;
    let user = state
        .db
        .users()
        .insert(
            &form.username,
            &form.normalized_email(),
            &form.full_name,
            &form.address,
            &form.phone,
            &password_hash,
            false,
        )
        .await?;

    info!(user_id = %user.id, "Customer registered");

    let token = state.jwt.issue(&user)?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            token,
            expires_in: state.jwt.lifetime_secs(),
            user,
        }),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(form): Json<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let rejected = || ApiError::unauthenticated("Invalid email or password");

    let user = state
        .db
        .users()
        .get_by_email(&form.email)
        .await?
        .ok_or_else(rejected)?;

    if !verify_password(&form.password, &user.password_hash) {
        warn!(user_id = %user.id, "Failed login attempt");
        return Err(rejected());
    }

    let token = state.jwt.issue(&user)?;
    Ok(Json(SessionResponse {
        token,
        expires_in: state.jwt.lifetime_secs(),
        user,
    }))
}

async fn me(State(state): State<Arc<AppState>>, user: AuthUser) -> ApiResult<Json<User>> {
    let user = state
        .db
        .users()
        .get_by_id(user.id())
        .await?
        .ok_or_else(|| ApiError::unauthenticated("Account no longer exists"))?;
    Ok(Json(user))
}
