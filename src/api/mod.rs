use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

pub mod auth;
mod error;
pub mod system;
mod types;
pub mod users;

pub use error::ApiError;
pub use types::*;

/// State handed to the handlers. The API layer is a thin adapter: it holds
/// the shared core and translates requests into service calls. Transport
/// concerns beyond request tracing (CORS, rate limiting, sessions, TLS) are
/// the embedding deployment's business.
#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,
}

impl AppState {
    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn credentials(&self) -> &Arc<dyn crate::services::CredentialService> {
        &self.shared.credentials
    }

    #[must_use]
    pub fn reset(&self) -> &Arc<dyn crate::services::ResetService> {
        &self.shared.reset
    }

    pub async fn config(&self) -> Config {
        self.shared.config.read().await.clone()
    }
}

#[must_use]
pub fn create_app_state(shared: Arc<SharedState>) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
    })
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
        .route("/api/users", post(users::create_user).get(users::list_users))
        .route(
            "/api/users/{id}",
            get(users::get_user).delete(users::delete_user),
        )
        .route("/api/users/{id}/password", put(users::set_password))
        .route("/api/users/{id}/facial", post(users::enroll_facial))
        .route("/api/users/{id}/login-method", put(users::set_login_method))
        .route("/api/system/health", get(system::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
