//! Application state shared across handlers.

use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::{config::Config, db::DbPool, storage::ObjectStore};

/// Session-token signing material, captured once from the configured
/// secret at startup.
#[derive(Clone)]
pub struct AuthKeys {
    secret: String,
}

impl AuthKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_owned(),
        }
    }

    pub fn encoding(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.as_ref())
    }

    pub fn decoding(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.as_ref())
    }
}

/// Application state shared across all handlers.
///
/// Cheap to clone: the pool and HTTP client are internally reference
/// counted, the rest is small configuration data.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub pool: DbPool,

    /// Object-storage client used for image/PDF uploads
    pub store: ObjectStore,

    /// Session-token keys
    pub auth: AuthKeys,

    /// Full configuration (bootstrap credentials for `/api/admin/init`)
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, pool: DbPool) -> Self {
        let store = ObjectStore::new(&config);
        let auth = AuthKeys::new(&config.jwt_secret);
        Self {
            pool,
            store,
            auth,
            config,
        }
    }
}
