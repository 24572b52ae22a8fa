//! Business logic services.
//!
//! - `admin`: credential verification, session tokens, account bootstrap
//! - `catalog`: category/instrument CRUD orchestration and the
//!   file-attachment transitions

pub mod admin;
pub mod catalog;
