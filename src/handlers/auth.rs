//! Authentication HTTP handlers
//!
//! Password login and refresh-token rotation.

use axum::{extract::State, Json};

use super::ValidatedJson;
use crate::auth::AuthError;
use crate::error::ApiResult;
use crate::models::{AuthTokensResponse, LoginRequest, RefreshTokenRequest};
use crate::services::ServiceError;
use crate::state::AppState;

/// POST /api/user/login - Exchange id and password for tokens
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthTokensResponse>> {
    // An id that is missing or not numeric cannot belong to any user
    let Some(user_id) = req.parsed_user_id() else {
        tracing::warn!("Login rejected: unusable user id");
        return Err(ServiceError::from(AuthError::InvalidCredentials).into());
    };

    let tokens = state.user_service.login(user_id, &req.password).await?;

    Ok(Json(AuthTokensResponse {
        token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        message: "Login successful".to_string(),
    }))
}

/// POST /api/user/refresh - Rotate a refresh token
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshTokenRequest>,
) -> ApiResult<Json<AuthTokensResponse>> {
    let tokens = state.user_service.refresh(&req.refresh_token).await?;

    Ok(Json(AuthTokensResponse {
        token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        message: "Token refreshed successfully".to_string(),
    }))
}
