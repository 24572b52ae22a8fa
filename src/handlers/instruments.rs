//! Instrument HTTP handlers.
//!
//! This module implements the instrument API endpoints:
//! - GET /api/instruments - Public paginated listing of in-stock items
//! - GET /api/instruments/:id - Public detail (404 when out of stock)
//! - GET /api/instruments/admin/list/all - Admin listing, stock ignored
//! - POST /api/instruments - Create instrument (multipart, admin)
//! - PUT /api/instruments/:id - Update instrument (multipart, admin)
//! - DELETE /api/instruments/:id - Delete instrument (admin)

use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    handlers::forms,
    middleware::auth::AdminContext,
    models::{
        MessageResponse,
        instrument::{InstrumentPage, InstrumentWithCategory},
    },
    services::catalog,
    state::AppState,
};

/// Query parameters for the public listing.
///
/// All values arrive as strings so that empty parameters
/// (`?category=&page=&limit=`) fall back to their defaults instead of
/// failing deserialization.
#[derive(Debug, Deserialize)]
pub struct PublicListQuery {
    #[serde(default)]
    page: Option<String>,
    #[serde(default)]
    limit: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

/// Public paginated listing of in-stock instruments.
///
/// # Endpoint
///
/// `GET /api/instruments?category=&page=&limit=` (public)
///
/// # Response (200 OK)
///
/// ```json
/// { "items": [...], "total": 12, "page": 2, "pages": 3 }
/// ```
///
/// Pages are 1-indexed; `limit` defaults to 12. Only in-stock
/// instruments are returned, newest first, each with its category
/// resolved.
pub async fn list_public(
    State(state): State<AppState>,
    Query(query): Query<PublicListQuery>,
) -> Result<Json<InstrumentPage>, AppError> {
    let page = query
        .page
        .as_deref()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(1);
    let limit = query
        .limit
        .as_deref()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(12);

    let category = match query.category.as_deref().filter(|raw| !raw.is_empty()) {
        Some(raw) => Some(raw.parse::<Uuid>().map_err(|_| {
            AppError::Validation("category must be a valid id".to_string())
        })?),
        None => None,
    };

    let instrument_page =
        catalog::list_public_instruments(&state.pool, category, page, limit).await?;

    Ok(Json(instrument_page))
}

/// Public instrument detail.
///
/// # Endpoint
///
/// `GET /api/instruments/:id` (public)
///
/// Returns 404 both when the id does not exist and when the instrument
/// is out of stock; callers cannot tell the cases apart.
pub async fn get_instrument(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InstrumentWithCategory>, AppError> {
    let instrument = catalog::get_public_instrument(&state.pool, id).await?;

    Ok(Json(instrument))
}

/// Admin listing of every instrument regardless of stock.
///
/// # Endpoint
///
/// `GET /api/instruments/admin/list/all` (admin)
pub async fn admin_list_all(
    State(state): State<AppState>,
) -> Result<Json<Vec<InstrumentWithCategory>>, AppError> {
    let instruments = catalog::list_all_instruments(&state.pool).await?;

    Ok(Json(instruments))
}

/// Create a new instrument.
///
/// # Endpoint
///
/// `POST /api/instruments` (multipart, admin)
///
/// # Form Fields
///
/// - `name`, `categoryId` (required)
/// - `description`, `videoUrl`, `inStock`, `specifications` (optional)
/// - `image`, `pdf` (optional): file parts uploaded to object storage,
///   or text parts carrying external URLs
///
/// # Response
///
/// - **Success (201 Created)**: the instrument with its category resolved
/// - **Error (400)**: name or categoryId missing, or categoryId unknown
/// - **Error (500)**: a file upload failed (nothing is persisted)
pub async fn create_instrument(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<InstrumentWithCategory>), AppError> {
    let form = forms::read_instrument_form(multipart).await?;
    let instrument = catalog::create_instrument(&state.pool, &state.store, form).await?;

    Ok((StatusCode::CREATED, Json(instrument)))
}

/// Update an instrument with partial semantics.
///
/// # Endpoint
///
/// `PUT /api/instruments/:id` (multipart, admin)
///
/// Only supplied fields change. The `pdf` attachment supports explicit
/// removal via `pdfRemove=true`, which wins over a simultaneously
/// attached replacement file; `image` supports replace only. A stock
/// toggle is simply an update carrying only `inStock`.
pub async fn update_instrument(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<InstrumentWithCategory>, AppError> {
    let form = forms::read_instrument_form(multipart).await?;
    let instrument = catalog::update_instrument(&state.pool, &state.store, id, form).await?;

    Ok(Json(instrument))
}

/// Delete an instrument.
///
/// # Endpoint
///
/// `DELETE /api/instruments/:id` (admin)
///
/// Files previously uploaded for the instrument remain in object
/// storage; only the database record is removed.
pub async fn delete_instrument(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    catalog::delete_instrument(&state.pool, id).await?;
    tracing::info!(admin_id = %admin.admin_id, admin = %admin.email, instrument_id = %id, "instrument deleted");

    Ok(Json(MessageResponse::new("Instrument deleted")))
}
