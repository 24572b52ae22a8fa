//! Admin identity service.
//!
//! Handles credential verification, session-token issue/verify, and the
//! idempotent bootstrap of the single admin account.
//!
//! # Security
//!
//! - Passwords are hashed with Argon2 (salted, one-way) before storage
//! - Unknown email and wrong password produce the identical error, so
//!   callers cannot enumerate accounts
//! - Tokens are HS256 JWTs carrying a fixed 12-hour expiry; there is no
//!   server-side session table

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};

use crate::{
    db::DbPool,
    error::AppError,
    models::admin::{AdminAccount, Claims},
    state::AuthKeys,
};

/// Session tokens expire this long after issuance.
const TOKEN_TTL_HOURS: i64 = 12;

/// Hash a password for storage with Argon2 and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AppError::Internal(format!("password hashing failed: {err}")))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash string.
///
/// Any parse or verification failure counts as a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Issue a signed session token for an admin account.
pub fn issue_token(keys: &AuthKeys, admin: &AdminAccount) -> Result<String, AppError> {
    let now = Utc::now();
    let exp = now + Duration::hours(TOKEN_TTL_HOURS);

    let claims = Claims {
        sub: admin.id,
        email: admin.email.clone(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding())
        .map_err(|err| AppError::Internal(format!("token signing failed: {err}")))
}

/// Decode and validate a session token.
///
/// Rejects tokens that are malformed, carry a bad signature, or have
/// expired. Whether the referenced account still exists is checked by
/// the auth middleware, which holds the database pool.
pub fn decode_token(keys: &AuthKeys, token: &str) -> Result<Claims, AppError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &keys.decoding(), &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized("Token is not valid"))
}

/// Verify email/password and return a fresh session token.
///
/// # Errors
///
/// `InvalidCredentials` both when the email is unknown and when the
/// password does not match, deliberately indistinguishable.
pub async fn login(
    pool: &DbPool,
    keys: &AuthKeys,
    email: &str,
    password: &str,
) -> Result<String, AppError> {
    let admin = sqlx::query_as::<_, AdminAccount>(
        "SELECT id, email, password_hash, created_at FROM admins WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(password, &admin.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    issue_token(keys, &admin)
}

/// Create the bootstrap admin account if no account exists yet.
///
/// Idempotent and safe to call on every startup: the count check short
/// circuits the common case and the insert ignores email conflicts, so
/// two concurrent callers cannot create duplicates.
pub async fn ensure_bootstrap_admin(
    pool: &DbPool,
    email: &str,
    password: &str,
) -> Result<(), AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    let password_hash = hash_password(password)?;
    sqlx::query("INSERT INTO admins (email, password_hash) VALUES ($1, $2) ON CONFLICT (email) DO NOTHING")
        .bind(email)
        .bind(&password_hash)
        .execute(pool)
        .await?;

    tracing::info!("Initial admin created: {email}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample_admin() -> AdminAccount {
        AdminAccount {
            id: Uuid::new_v4(),
            email: "admin@vega.com".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_decode_token() {
        let keys = AuthKeys::new("test-secret");
        let admin = sample_admin();

        let token = issue_token(&keys, &admin).expect("Failed to issue token");
        let claims = decode_token(&keys, &token).expect("Failed to decode token");

        assert_eq!(claims.sub, admin.id);
        assert_eq!(claims.email, admin.email);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = AuthKeys::new("test-secret");
        let admin = sample_admin();
        let now = Utc::now();

        let claims = Claims {
            sub: admin.id,
            email: admin.email,
            iat: (now - Duration::hours(13)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(), // Expired
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding()).unwrap();

        assert!(decode_token(&keys, &token).is_err());
    }

    #[test]
    fn test_token_signed_with_different_key_rejected() {
        let admin = sample_admin();
        let token = issue_token(&AuthKeys::new("key-one"), &admin).unwrap();

        assert!(decode_token(&AuthKeys::new("key-two"), &token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let keys = AuthKeys::new("test-secret");
        assert!(decode_token(&keys, "not-a-token").is_err());
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("admin123").expect("Failed to hash");

        assert_ne!(hash, "admin123");
        assert!(verify_password("admin123", &hash));
        assert!(!verify_password("admin124", &hash));
    }

    #[test]
    fn test_verify_against_malformed_hash_is_a_mismatch() {
        assert!(!verify_password("admin123", "not-a-phc-string"));
    }
}
