//! HTTP request handlers.
//!
//! Thin boundary layer: parse the request, call into a service, map the
//! result to a status code and JSON body.

pub mod admin;
pub mod categories;
pub mod forms;
pub mod health;
pub mod instruments;
