//! HTTP middleware.
//!
//! Currently contains only the admin session-token authentication
//! middleware applied to mutating catalog routes.

pub mod auth;
