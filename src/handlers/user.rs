//! User-related API handlers

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use super::{AuthenticatedUser, ValidatedJson};
use crate::error::{ApiError, ApiResult};
use crate::models::{ApiResponse, CreateUserRequest, UpdateUserRequest, UserResponse, WorkflowState};
use crate::registration::RegistrationInput;
use crate::services::{ServiceError, UserUpdate};
use crate::state::AppState;

/// GET /api/user/:user_id - Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let user = state.user_service.get_user(user_id).await?;

    Ok(Json(ApiResponse::ok(
        UserResponse::from(user),
        "User retrieved successfully",
    )))
}

/// POST /api/user - Register a new user
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_service
        .insert_user(RegistrationInput {
            user_name: req.user_name,
            email: req.email,
            password: req.password,
        })
        .await?;

    let location = format!("/api/user/{}", user.id);
    let body = ApiResponse::ok(UserResponse::from(user), "User inserted successfully");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(body),
    ))
}

/// PUT /api/user - Replace a user's name, email and password
pub async fn update_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let id = req
        .id
        .ok_or_else(|| ApiError::ValidationError("User id is required".to_string()))?;

    let result = state
        .user_service
        .update_user(UserUpdate {
            id,
            user_name: req.user_name.clone(),
            email: req.email.clone(),
            password: req.password,
        })
        .await;

    // Unknown ids and email clashes are both reported as a failed update
    match result {
        Ok(true) => {}
        Ok(false) | Err(ServiceError::AlreadyExists(_)) => {
            return Err(ApiError::UpdateFailed(
                "The user could not be updated. Please check the provided data.".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Json(ApiResponse::ok(
        UserResponse {
            id,
            user_name: req.user_name,
            email: req.email,
        },
        "User updated successfully",
    )))
}

/// GET /api/user/:user_id/workflow - Registration log of a user
pub async fn get_workflow_history(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<ApiResponse<Vec<WorkflowState>>>> {
    let history = state.user_service.workflow_history(user_id).await?;

    Ok(Json(ApiResponse::ok(
        history,
        "Workflow history retrieved successfully",
    )))
}

/// GET /api/user/me - The caller's own record
pub async fn get_current_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let record = state.user_service.get_user(user.user_id).await?;

    Ok(Json(ApiResponse::ok(
        UserResponse::from(record),
        "User retrieved successfully",
    )))
}
