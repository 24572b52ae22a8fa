//! Vega Instruments Catalog Service
//!
//! REST API for a product catalog: public storefront endpoints (category
//! listing, paginated in-stock instrument listing, instrument detail) and a
//! token-protected admin surface for CRUD of categories and instruments,
//! with a multipart upload pipeline that stores images and PDFs in
//! S3-compatible object storage.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server, multipart forms)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: single admin account, 12-hour HS256 session tokens
//! - **File Storage**: S3-compatible REST PUT with SigV4 request signing
//! - **Format**: JSON responses; multipart requests for uploads

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
