//! Admin account model, login payloads, and session-token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents an admin account record from the database.
///
/// Exactly one account is provisioned by the startup bootstrap when the
/// table is empty. The password is stored only as an Argon2 PHC hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminAccount {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /api/admin/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response body for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Session-token claims.
///
/// The token is stateless: validity is determined entirely by the
/// signature and `exp`, plus a lookup confirming the account still
/// exists when the token is presented.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Admin account id
    pub sub: Uuid,
    pub email: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds), 12 hours after issuance
    pub exp: i64,
}
