//! Admin session-token authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the session token from the Authorization header
//! 2. Validate its signature and expiry
//! 3. Confirm the referenced admin account still exists
//! 4. Inject the admin identity into the request
//! 5. Reject unauthorized requests with HTTP 401

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{error::AppError, models::admin::AdminAccount, services::admin, state::AppState};

/// Admin identity attached to authenticated requests.
///
/// Inserted into the request's extension map; handlers that care about
/// who performed an action can extract it with `Extension<AdminContext>`.
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub admin_id: Uuid,
    pub email: String,
}

/// Session-token authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <token>` header from request
/// 2. Decode and validate the token (signature + expiry)
/// 3. Load the admin account the token references
/// 4. If found: inject `AdminContext` into request, call next handler
/// 5. Otherwise: return 401 Unauthorized
///
/// # Headers
///
/// Expected header format:
/// ```text
/// Authorization: Bearer <token>
/// ```
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or(AppError::Unauthorized("No token, authorization denied"))?;

    let claims = admin::decode_token(&state.auth, token)?;

    // A valid token for a deleted account is still unauthorized.
    let account = sqlx::query_as::<_, AdminAccount>(
        "SELECT id, email, password_hash, created_at FROM admins WHERE id = $1",
    )
    .bind(claims.sub)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::Unauthorized("Invalid token"))?;

    request.extensions_mut().insert(AdminContext {
        admin_id: account.id,
        email: account.email,
    });

    Ok(next.run(request).await)
}

/// Pull the bearer token out of the Authorization header, if any.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_tokens() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }

    #[test]
    fn rejects_missing_or_non_bearer_headers() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
    }
}
