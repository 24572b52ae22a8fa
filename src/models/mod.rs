//! Data models for catalog entities and API payloads.

pub mod admin;
pub mod category;
pub mod instrument;

use serde::Serialize;

/// Generic `{"message": ...}` body for deletes and status endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
