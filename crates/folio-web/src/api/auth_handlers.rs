use axum::extract::State;
use axum::Json;

use crate::auth::rate_limit::LoginQuota;
use crate::dto::{LoginRequest, LoginResponse, UserDto};
use crate::error::AppError;
use crate::state::AppState;

pub async fn login(
    _quota: LoginQuota,
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let authenticator = state.authenticator.clone();
    let now = state.clock.unix_secs();

    // Argon2 verification is CPU-bound; keep it off the async workers.
    let issued = tokio::task::spawn_blocking(move || {
        authenticator.issue(&body.username, &body.password, now)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    tracing::info!("Login succeeded for user: {}", issued.subject);

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token: issued.token,
        expires_at: issued.expires_at,
        user: UserDto {
            username: issued.subject.into_inner(),
        },
    }))
}
