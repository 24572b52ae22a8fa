//! Admin authentication HTTP handlers.
//!
//! - POST /api/admin/login - Exchange credentials for a session token
//! - POST /api/admin/init - Idempotent bootstrap of the admin account

use axum::{Json, extract::State};

use crate::{
    error::AppError,
    models::{
        MessageResponse,
        admin::{LoginRequest, LoginResponse},
    },
    services::admin,
    state::AppState,
};

/// Log in as the administrator.
///
/// # Request Body
///
/// ```json
/// { "email": "admin@vega.com", "password": "admin123" }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: `{ "token": "<jwt>" }`, valid for 12 hours
/// - **Error (400)**: `{ "message": "Invalid credentials" }`, identical
///   for unknown email and wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let token = admin::login(&state.pool, &state.auth, &request.email, &request.password).await?;

    Ok(Json(LoginResponse { token }))
}

/// Ensure the bootstrap admin account exists.
///
/// Idempotent: calling it repeatedly leaves exactly one account. The
/// same routine runs at process startup, so this endpoint exists mainly
/// for first-run provisioning from the admin UI.
pub async fn init_admin(State(state): State<AppState>) -> Result<Json<MessageResponse>, AppError> {
    admin::ensure_bootstrap_admin(
        &state.pool,
        &state.config.admin_email,
        &state.config.admin_password,
    )
    .await?;

    Ok(Json(MessageResponse::new("Admin ensured")))
}
