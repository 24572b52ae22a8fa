//! Category management HTTP handlers.
//!
//! This module implements the category API endpoints:
//! - GET /api/categories - Public, ordered category listing
//! - POST /api/categories - Create category (multipart, admin)
//! - PUT /api/categories/:id - Update category (multipart, admin)
//! - DELETE /api/categories/:id - Delete category (admin)

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    handlers::forms,
    middleware::auth::AdminContext,
    models::{MessageResponse, category::Category},
    services::catalog,
    state::AppState,
};

/// List all categories, sorted by name ascending.
///
/// # Endpoint
///
/// `GET /api/categories` (public)
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = catalog::list_categories(&state.pool).await?;

    Ok(Json(categories))
}

/// Create a new category.
///
/// # Endpoint
///
/// `POST /api/categories` (multipart, admin)
///
/// # Form Fields
///
/// - `name` (required)
/// - `description` (optional)
/// - `image` (optional): either a file part uploaded to object storage,
///   or a text part carrying an external URL
///
/// # Response
///
/// - **Success (201 Created)**: the created category
/// - **Error (400)**: name missing
/// - **Error (500)**: image upload failed (nothing is persisted)
pub async fn create_category(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let form = forms::read_category_form(multipart).await?;
    let category = catalog::create_category(&state.pool, &state.store, form).await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category with partial semantics.
///
/// # Endpoint
///
/// `PUT /api/categories/:id` (multipart, admin)
///
/// Only the supplied form fields are changed; a new image file or URL
/// replaces the stored one, and there is no image-removal path.
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Category>, AppError> {
    let form = forms::read_category_form(multipart).await?;
    let category = catalog::update_category(&state.pool, &state.store, id, form).await?;

    Ok(Json(category))
}

/// Delete a category.
///
/// # Endpoint
///
/// `DELETE /api/categories/:id` (admin)
///
/// Instruments referencing the category keep existing with a cleared
/// category reference; they are not deleted.
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    catalog::delete_category(&state.pool, id).await?;
    tracing::info!(admin_id = %admin.admin_id, admin = %admin.email, category_id = %id, "category deleted");

    Ok(Json(MessageResponse::new("Category deleted")))
}
