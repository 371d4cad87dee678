//! Administrative user-record surface. Runs in a trusted context, so unlike
//! the auth routes these handlers return detailed diagnostics.

use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, CreateUserRequest, EnrollFacialRequest, MessageResponse,
    SetLoginMethodRequest, SetPasswordRequest,
};
use crate::db::NewUser;
use crate::entities::users::{LoginMethod, Role};
use crate::services::{UserAccount, validate_password_policy};

/// POST /api/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<UserAccount>>, ApiError> {
    if payload.email.is_empty() || !payload.email.contains('@') {
        return Err(ApiError::validation("A valid email is required"));
    }

    let role = match payload.role.as_deref() {
        None => Role::Standard,
        Some(value) => Role::parse(value)
            .ok_or_else(|| ApiError::validation(format!("Unknown role '{value}'")))?,
    };

    // Check the policy before touching the store so a weak password cannot
    // leave a half-provisioned record behind.
    if let Some(password) = &payload.password {
        let security = state.config().await.security;
        validate_password_policy(password, &security)?;
    }

    let user = state
        .store()
        .insert_user(NewUser {
            email: payload.email,
            display_name: payload.display_name,
            role,
            password_hash: None,
        })
        .await?;

    if let Some(password) = &payload.password {
        state.credentials().set_password(user.id, password).await?;
    }

    let user = state
        .store()
        .get_user_by_id(user.id)
        .await?
        .ok_or_else(|| ApiError::internal("created user vanished"))?;

    tracing::info!(user_id = user.id, "user record created");

    Ok(Json(ApiResponse::success(UserAccount::from(user))))
}

/// GET /api/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserAccount>>>, ApiError> {
    let users = state.store().list_users().await?;

    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserAccount::from).collect(),
    )))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserAccount>>, ApiError> {
    let user = state
        .store()
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::user_not_found(id))?;

    Ok(Json(ApiResponse::success(UserAccount::from(user))))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if !state.store().remove_user(id).await? {
        return Err(ApiError::user_not_found(id));
    }

    tracing::info!(user_id = id, "user record deleted");

    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("User {id} deleted"),
    })))
}

/// PUT /api/users/{id}/password
pub async fn set_password(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<SetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .credentials()
        .set_password(id, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password updated successfully".to_string(),
    })))
}

/// POST /api/users/{id}/facial
pub async fn enroll_facial(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<EnrollFacialRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .credentials()
        .enroll_facial(id, &payload.descriptor, payload.metadata)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Facial credential enrolled".to_string(),
    })))
}

/// PUT /api/users/{id}/login-method
pub async fn set_login_method(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<SetLoginMethodRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let method = LoginMethod::parse(&payload.method)
        .ok_or_else(|| ApiError::validation(format!("Unknown login method '{}'", payload.method)))?;

    state.credentials().set_login_method(id, method).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("Login method set to {}", payload.method),
    })))
}
