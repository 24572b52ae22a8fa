//! Vega Instruments Catalog - Main Application Entry Point
//!
//! REST API server for the instrument catalog: public storefront reads
//! and token-protected admin CRUD with file uploads to object storage.
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool and run migrations
//! 3. Bootstrap the admin account (idempotent)
//! 4. Reconcile orphaned category references left by a crashed delete
//! 5. Build HTTP router with routes and middleware
//! 6. Start server on configured port

use tracing_subscriber::EnvFilter;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use vega_catalog::{
    config::Config,
    db, handlers,
    middleware::auth::require_admin,
    services::{admin, catalog},
    state::AppState,
};

/// Matches the original upload limit of 8 MiB per request.
const MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    // Provision the admin account on first run
    admin::ensure_bootstrap_admin(&pool, &config.admin_email, &config.admin_password).await?;

    // Retry the category-delete follow-up in case a previous process
    // crashed between the delete and the bulk null-out
    let repaired = catalog::reconcile_orphaned_category_refs(&pool).await?;
    if repaired > 0 {
        tracing::warn!(repaired, "cleared orphaned category references");
    }

    let state = AppState::new(config.clone(), pool);
    if !state.store.is_configured() {
        tracing::warn!("AWS_S3_BUCKET not set - uploads will fail if used");
    }

    // Mutating catalog routes and the admin listing require a valid
    // session token; public reads on the same paths stay open, so the
    // auth layer is attached per method router rather than per path.
    let admin_only = axum_middleware::from_fn_with_state(state.clone(), require_admin);

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        // Admin authentication (public endpoints)
        .route("/api/admin/init", post(handlers::admin::init_admin))
        .route("/api/admin/login", post(handlers::admin::login))
        // Categories
        .route(
            "/api/categories",
            get(handlers::categories::list_categories).merge(
                post(handlers::categories::create_category).route_layer(admin_only.clone()),
            ),
        )
        .route(
            "/api/categories/{id}",
            put(handlers::categories::update_category)
                .delete(handlers::categories::delete_category)
                .route_layer(admin_only.clone()),
        )
        // Instruments
        .route(
            "/api/instruments",
            get(handlers::instruments::list_public).merge(
                post(handlers::instruments::create_instrument).route_layer(admin_only.clone()),
            ),
        )
        .route(
            "/api/instruments/admin/list/all",
            get(handlers::instruments::admin_list_all).route_layer(admin_only.clone()),
        )
        .route(
            "/api/instruments/{id}",
            get(handlers::instruments::get_instrument).merge(
                put(handlers::instruments::update_instrument)
                    .delete(handlers::instruments::delete_instrument)
                    .route_layer(admin_only),
            ),
        )
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Start serving HTTP requests
    axum::serve(listener, app).await?;

    Ok(())
}
