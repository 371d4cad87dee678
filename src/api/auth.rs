use axum::{Json, extract::State};
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, ForgotPasswordRequest, LoginRequest, MessageResponse,
    ResetPasswordRequest,
};
use crate::errors::IdentityError;
use crate::services::UserAccount;

/// POST /api/auth/login
///
/// Authenticates by password or facial descriptor. Every failure (unknown
/// email, wrong secret, wrong method, inactive account) produces the same
/// 401 body.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<UserAccount>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    let method = payload.method.as_deref().unwrap_or("password");

    let account = match method {
        "password" => {
            let Some(password) = payload.password else {
                return Err(ApiError::validation("Password is required"));
            };
            state
                .credentials()
                .verify_password(&payload.email, &password)
                .await?
        }
        "facial" => {
            let Some(descriptor) = payload.descriptor else {
                return Err(ApiError::validation("Descriptor is required"));
            };

            // Resolve the email here; a miss renders as the same AuthFailed
            // as a failed match.
            let user = state
                .store()
                .get_user_by_email(&payload.email)
                .await?
                .ok_or(ApiError::AuthFailed)?;

            let threshold = state.config().await.security.facial_match_threshold;
            let accepted = match state
                .credentials()
                .verify_facial(user.id, &descriptor, threshold)
                .await
            {
                Ok(accepted) => accepted,
                // Transient store faults stay retryable. Everything else
                // (no enrolled credential, corrupt descriptor) renders as
                // the same failure as a bad match, so this route cannot
                // reveal which credentials an account has.
                Err(e @ IdentityError::StoreUnavailable(_)) => return Err(e.into()),
                Err(e) => {
                    tracing::debug!(user_id = user.id, error = %e, "facial login coarsened");
                    false
                }
            };
            if !accepted {
                return Err(ApiError::AuthFailed);
            }

            state
                .store()
                .get_user_by_id(user.id)
                .await?
                .map(UserAccount::from)
                .ok_or(ApiError::AuthFailed)?
        }
        other => {
            return Err(ApiError::validation(format!(
                "Unknown login method '{other}'"
            )));
        }
    };

    Ok(Json(ApiResponse::success(account)))
}

/// POST /api/auth/forgot-password
///
/// Always answers with the same body, whether or not the account exists.
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    state.reset().issue(&payload.email).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "If the account exists, a reset link has been sent".to_string(),
    })))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.token.is_empty() {
        return Err(ApiError::InvalidToken);
    }

    state
        .reset()
        .redeem(&payload.token, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password updated successfully".to_string(),
    })))
}
