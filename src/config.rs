//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.
//!
//! The config is constructed once in `main` and handed by reference to the
//! components that need it (token keys, object store, bootstrap admin); no
//! component reads the environment at call time.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 5000
/// - `JWT_SECRET` (required): HMAC secret for signing admin session tokens
/// - `ADMIN_EMAIL` / `ADMIN_PASSWORD` (optional): credentials for the
///   bootstrap admin account, with development defaults
/// - `AWS_S3_BUCKET` (optional): object-storage bucket; uploads fail at
///   call time when unset
/// - `AWS_REGION`, `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` (optional):
///   object-storage region and credentials
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    pub jwt_secret: String,

    #[serde(default = "default_admin_email")]
    pub admin_email: String,

    #[serde(default = "default_admin_password")]
    pub admin_password: String,

    #[serde(default)]
    pub aws_s3_bucket: Option<String>,

    #[serde(default = "default_aws_region")]
    pub aws_region: String,

    #[serde(default)]
    pub aws_access_key_id: String,

    #[serde(default)]
    pub aws_secret_access_key: String,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    5000
}

fn default_admin_email() -> String {
    "admin@vega.com".to_string()
}

fn default_admin_password() -> String {
    "admin123".to_string()
}

fn default_aws_region() -> String {
    "us-east-1".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Parse environment variables into Config struct
        // Field names are automatically converted: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }
}
