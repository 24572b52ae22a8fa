//! Catalog service - CRUD orchestration for categories and instruments.
//!
//! This service owns the decision logic around file attachments and the
//! referential cleanup between the two entities:
//!
//! - Every request resolves its attachment transitions first, so no row
//!   is written until required uploads have completed successfully
//! - Deleting a category clears `category_id` on dependent instruments
//!   instead of cascading the delete
//! - Partial updates are explicit patch structs merged onto the stored
//!   record; absent fields keep their values

use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        category::{Category, CategoryForm, CategoryPatch},
        instrument::{
            self, Instrument, InstrumentForm, InstrumentPage, InstrumentPatch,
            InstrumentWithCategory, SELECT_WITH_CATEGORY,
        },
    },
    storage::{ObjectStore, UploadedFile},
};

/// Object-storage namespaces, one per attachment purpose.
const NS_CATEGORIES: &str = "categories";
const NS_INSTRUMENT_IMAGES: &str = "instruments/images";
const NS_INSTRUMENT_PDFS: &str = "instruments/pdfs";

/// What an update request means for one attachment field.
///
/// Resolved from the request parts in strict precedence order; `Remove`
/// wins even when a replacement file is attached in the same request.
#[derive(Debug)]
pub enum AttachmentChange {
    /// Field untouched
    Keep,
    /// Stored value cleared to the empty string (pdf only)
    Remove,
    /// New file uploaded to object storage, field set to its URL
    Upload(UploadedFile),
    /// Field set to a caller-supplied URL, no upload
    Reference(String),
}

impl AttachmentChange {
    /// Resolve the transition for a field that supports explicit removal.
    ///
    /// Precedence: remove flag > attached file > raw URL > keep.
    pub fn resolve(remove: bool, file: Option<UploadedFile>, url: Option<String>) -> Self {
        if remove {
            return Self::Remove;
        }
        if let Some(file) = file {
            return Self::Upload(file);
        }
        if let Some(url) = url {
            return Self::Reference(url);
        }
        Self::Keep
    }

    /// Resolve the transition for a field with no removal path (images,
    /// and the pdf at creation time where removal is meaningless).
    pub fn replace_only(file: Option<UploadedFile>, url: Option<String>) -> Self {
        Self::resolve(false, file, url)
    }

    /// Turn the transition into a patch value, performing the upload if
    /// one is needed. `None` means "keep the stored value".
    pub async fn apply(
        self,
        store: &ObjectStore,
        namespace: &str,
    ) -> Result<Option<String>, AppError> {
        match self {
            Self::Keep => Ok(None),
            Self::Remove => Ok(Some(String::new())),
            Self::Upload(file) => Ok(Some(store.upload(&file, namespace).await?)),
            Self::Reference(url) => Ok(Some(url)),
        }
    }
}

/// List all categories, ordered by name.
pub async fn list_categories(pool: &DbPool) -> Result<Vec<Category>, AppError> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name, description, image, created_at, updated_at
         FROM categories ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

/// Create a category.
///
/// # Process
///
/// 1. Validate the name is present
/// 2. Upload the image (or take the supplied URL)
/// 3. Insert the row
pub async fn create_category(
    pool: &DbPool,
    store: &ObjectStore,
    form: CategoryForm,
) -> Result<Category, AppError> {
    let name = form
        .name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::Validation("Name required".to_string()))?;

    // Upload before touching the database; a failed upload must not
    // leave a partially-written record.
    let image = AttachmentChange::replace_only(form.image_file, form.image_url)
        .apply(store, NS_CATEGORIES)
        .await?
        .unwrap_or_default();

    sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name, description, image)
        VALUES ($1, $2, $3)
        RETURNING id, name, description, image, created_at, updated_at
        "#,
    )
    .bind(&name)
    .bind(form.description.unwrap_or_default())
    .bind(&image)
    .fetch_one(pool)
    .await
    .map_err(map_duplicate_name)
}

/// Update a category with partial semantics.
pub async fn update_category(
    pool: &DbPool,
    store: &ObjectStore,
    id: Uuid,
    form: CategoryForm,
) -> Result<Category, AppError> {
    let mut category = sqlx::query_as::<_, Category>(
        "SELECT id, name, description, image, created_at, updated_at FROM categories WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Category not found"))?;

    let image = AttachmentChange::replace_only(form.image_file, form.image_url)
        .apply(store, NS_CATEGORIES)
        .await?;

    CategoryPatch {
        name: form.name,
        description: form.description,
        image,
    }
    .merge_into(&mut category);

    sqlx::query_as::<_, Category>(
        r#"
        UPDATE categories
        SET name = $2, description = $3, image = $4, updated_at = NOW()
        WHERE id = $1
        RETURNING id, name, description, image, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(&category.name)
    .bind(&category.description)
    .bind(&category.image)
    .fetch_one(pool)
    .await
    .map_err(map_duplicate_name)
}

/// Delete a category and clear the reference on dependent instruments.
///
/// The delete commits first; the bulk null-out is a follow-up step that
/// must complete before success is reported. There is no rollback if the
/// follow-up fails. It is idempotent, and the startup reconciliation
/// pass retries it (see [`reconcile_orphaned_category_refs`]).
pub async fn delete_category(pool: &DbPool, id: Uuid) -> Result<(), AppError> {
    let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound("Category not found"));
    }

    let cleared = sqlx::query("UPDATE instruments SET category_id = NULL WHERE category_id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if cleared.rows_affected() > 0 {
        tracing::info!(
            category_id = %id,
            instruments = cleared.rows_affected(),
            "cleared category reference on dependent instruments"
        );
    }

    Ok(())
}

/// Null out category references that no longer resolve.
///
/// Covers a crash between a category delete and its follow-up null-out.
/// Safe to run on every startup; returns the number of repaired rows.
pub async fn reconcile_orphaned_category_refs(pool: &DbPool) -> Result<u64, AppError> {
    let repaired = sqlx::query(
        r#"
        UPDATE instruments SET category_id = NULL
        WHERE category_id IS NOT NULL
          AND NOT EXISTS (SELECT 1 FROM categories c WHERE c.id = instruments.category_id)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(repaired.rows_affected())
}

/// Create an instrument.
///
/// # Process
///
/// 1. Validate name and categoryId are present and the category exists
/// 2. Resolve image/pdf attachments (uploads happen here)
/// 3. Insert the row and return it with its category resolved
pub async fn create_instrument(
    pool: &DbPool,
    store: &ObjectStore,
    form: InstrumentForm,
) -> Result<InstrumentWithCategory, AppError> {
    let name = form.name.filter(|name| !name.is_empty());
    let (Some(name), Some(category_id)) = (name, form.category_id) else {
        return Err(AppError::Validation(
            "name and categoryId are required".to_string(),
        ));
    };

    let category_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(category_id)
            .fetch_one(pool)
            .await?;
    if !category_exists {
        return Err(AppError::Validation(
            "categoryId does not reference an existing category".to_string(),
        ));
    }

    // Removal is meaningless at creation, so both attachments follow the
    // replace-only rules. Uploads complete before the insert.
    let image = AttachmentChange::replace_only(form.image_file, form.image_url)
        .apply(store, NS_INSTRUMENT_IMAGES)
        .await?
        .unwrap_or_default();
    let pdf = AttachmentChange::replace_only(form.pdf_file, form.pdf_url)
        .apply(store, NS_INSTRUMENT_PDFS)
        .await?
        .unwrap_or_default();

    let specifications = serde_json::to_value(form.specifications.unwrap_or_default())
        .map_err(|err| AppError::Internal(format!("specifications encoding failed: {err}")))?;

    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO instruments
            (name, category_id, description, specifications, image, video_url, pdf, in_stock)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(&name)
    .bind(category_id)
    .bind(form.description.unwrap_or_default())
    .bind(specifications)
    .bind(&image)
    .bind(form.video_url.unwrap_or_default())
    .bind(&pdf)
    .bind(form.in_stock.unwrap_or(true))
    .fetch_one(pool)
    .await?;

    fetch_with_category(pool, id)
        .await?
        .ok_or_else(|| AppError::Internal("created instrument missing on re-read".to_string()))
}

/// Update an instrument with partial semantics.
///
/// The pdf attachment supports the full transition set including
/// explicit removal; the image supports replace only.
pub async fn update_instrument(
    pool: &DbPool,
    store: &ObjectStore,
    id: Uuid,
    form: InstrumentForm,
) -> Result<InstrumentWithCategory, AppError> {
    let row = sqlx::query(
        "SELECT id, name, category_id, description, specifications, image, video_url, pdf,
                in_stock, created_at, updated_at
         FROM instruments WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Instrument not found"))?;
    let mut existing: Instrument = instrument::from_row(&row)?;

    // Resolve attachments first so a failed upload aborts the request
    // before anything is written.
    let image = AttachmentChange::replace_only(form.image_file, form.image_url)
        .apply(store, NS_INSTRUMENT_IMAGES)
        .await?;
    let pdf = AttachmentChange::resolve(form.pdf_remove, form.pdf_file, form.pdf_url)
        .apply(store, NS_INSTRUMENT_PDFS)
        .await?;

    InstrumentPatch {
        name: form.name,
        category_id: form.category_id,
        description: form.description,
        specifications: form.specifications,
        video_url: form.video_url,
        in_stock: form.in_stock,
        image,
        pdf,
    }
    .merge_into(&mut existing);

    let specifications = serde_json::to_value(&existing.specifications)
        .map_err(|err| AppError::Internal(format!("specifications encoding failed: {err}")))?;

    sqlx::query(
        r#"
        UPDATE instruments
        SET name = $2, category_id = $3, description = $4, specifications = $5,
            image = $6, video_url = $7, pdf = $8, in_stock = $9, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&existing.name)
    .bind(existing.category_id)
    .bind(&existing.description)
    .bind(specifications)
    .bind(&existing.image)
    .bind(&existing.video_url)
    .bind(&existing.pdf)
    .bind(existing.in_stock)
    .execute(pool)
    .await?;

    fetch_with_category(pool, id)
        .await?
        .ok_or(AppError::NotFound("Instrument not found"))
}

/// Delete an instrument.
///
/// Uploaded files referenced by the record are left in object storage;
/// only the database row is removed.
pub async fn delete_instrument(pool: &DbPool, id: Uuid) -> Result<(), AppError> {
    let deleted = sqlx::query("DELETE FROM instruments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound("Instrument not found"));
    }

    Ok(())
}

/// Fetch one instrument with its category resolved.
pub async fn fetch_with_category(
    pool: &DbPool,
    id: Uuid,
) -> Result<Option<InstrumentWithCategory>, AppError> {
    let sql = format!("{SELECT_WITH_CATEGORY} WHERE i.id = $1");
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;

    row.map(|row| instrument::with_category_from_row(&row))
        .transpose()
}

/// Fetch one instrument for the public storefront.
///
/// Out-of-stock instruments are hidden: the caller sees the same 404 as
/// for an id that does not exist, just with the original wording.
pub async fn get_public_instrument(
    pool: &DbPool,
    id: Uuid,
) -> Result<InstrumentWithCategory, AppError> {
    let found = fetch_with_category(pool, id)
        .await?
        .ok_or(AppError::NotFound("Instrument not found"))?;

    if !found.instrument.in_stock {
        return Err(AppError::NotFound("Instrument not available"));
    }

    Ok(found)
}

/// Paginated public listing of in-stock instruments.
///
/// Two-query pattern: the total comes from a count query independent of
/// the page fetch. Both are read-only and unrelated, so they run
/// concurrently. Not guaranteed consistent under concurrent writes,
/// which is acceptable for this domain.
pub async fn list_public_instruments(
    pool: &DbPool,
    category: Option<Uuid>,
    page: u32,
    limit: u32,
) -> Result<InstrumentPage, AppError> {
    let page = page.max(1);
    let limit = limit.max(1);
    let offset = i64::from(page - 1) * i64::from(limit);

    let count_query = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM instruments
         WHERE in_stock = TRUE AND ($1::uuid IS NULL OR category_id = $1)",
    )
    .bind(category)
    .fetch_one(pool);

    let sql = format!(
        "{SELECT_WITH_CATEGORY}
         WHERE i.in_stock = TRUE AND ($1::uuid IS NULL OR i.category_id = $1)
         ORDER BY i.created_at DESC
         LIMIT $2 OFFSET $3"
    );
    let rows_query = sqlx::query(&sql)
        .bind(category)
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(pool);

    let (total, rows) = tokio::join!(count_query, rows_query);
    let total = total?;
    let items = rows?
        .iter()
        .map(instrument::with_category_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(InstrumentPage {
        items,
        total,
        page,
        pages: page_count(total, limit),
    })
}

/// Admin listing: every instrument regardless of stock, newest first.
pub async fn list_all_instruments(pool: &DbPool) -> Result<Vec<InstrumentWithCategory>, AppError> {
    let sql = format!("{SELECT_WITH_CATEGORY} ORDER BY i.created_at DESC");
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    rows.iter()
        .map(instrument::with_category_from_row)
        .collect()
}

/// Number of pages needed for `total` records at `limit` per page.
fn page_count(total: i64, limit: u32) -> i64 {
    let limit = i64::from(limit.max(1));
    (total + limit - 1) / limit
}

/// Surface a duplicate category name as the violated constraint instead
/// of a generic server error.
fn map_duplicate_name(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return AppError::Validation("Category name already exists".to_string());
        }
    }
    AppError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn pdf_file() -> UploadedFile {
        UploadedFile {
            bytes: b"%PDF-1.4".to_vec(),
            file_name: "manual.pdf".to_string(),
            content_type: "application/pdf".to_string(),
        }
    }

    fn unconfigured_store() -> ObjectStore {
        ObjectStore::new(&Config {
            database_url: String::new(),
            server_port: 5000,
            jwt_secret: "test".to_string(),
            admin_email: "admin@vega.com".to_string(),
            admin_password: "admin123".to_string(),
            aws_s3_bucket: None,
            aws_region: "us-east-1".to_string(),
            aws_access_key_id: String::new(),
            aws_secret_access_key: String::new(),
        })
    }

    #[test]
    fn remove_flag_wins_over_a_simultaneous_upload() {
        let change = AttachmentChange::resolve(true, Some(pdf_file()), None);
        assert!(matches!(change, AttachmentChange::Remove));

        let change = AttachmentChange::resolve(
            true,
            Some(pdf_file()),
            Some("https://example.com/manual.pdf".to_string()),
        );
        assert!(matches!(change, AttachmentChange::Remove));
    }

    #[test]
    fn attached_file_wins_over_a_raw_url() {
        let change = AttachmentChange::resolve(
            false,
            Some(pdf_file()),
            Some("https://example.com/manual.pdf".to_string()),
        );
        assert!(matches!(change, AttachmentChange::Upload(_)));
    }

    #[test]
    fn raw_url_is_a_replace_by_reference() {
        let change =
            AttachmentChange::resolve(false, None, Some("https://example.com/m.pdf".to_string()));
        assert!(matches!(change, AttachmentChange::Reference(_)));
    }

    #[test]
    fn nothing_supplied_keeps_the_field() {
        assert!(matches!(
            AttachmentChange::resolve(false, None, None),
            AttachmentChange::Keep
        ));
        assert!(matches!(
            AttachmentChange::replace_only(None, None),
            AttachmentChange::Keep
        ));
    }

    #[tokio::test]
    async fn keep_and_remove_and_reference_need_no_storage_round_trip() {
        let store = unconfigured_store();

        let kept = AttachmentChange::Keep.apply(&store, "instruments/pdfs").await;
        assert_eq!(kept.unwrap(), None);

        let removed = AttachmentChange::Remove.apply(&store, "instruments/pdfs").await;
        assert_eq!(removed.unwrap(), Some(String::new()));

        let referenced = AttachmentChange::Reference("https://example.com/m.pdf".to_string())
            .apply(&store, "instruments/pdfs")
            .await;
        assert_eq!(
            referenced.unwrap(),
            Some("https://example.com/m.pdf".to_string())
        );
    }

    #[tokio::test]
    async fn upload_against_unconfigured_store_is_a_storage_failure() {
        let store = unconfigured_store();

        let result = AttachmentChange::Upload(pdf_file())
            .apply(&store, "instruments/pdfs")
            .await;

        assert!(matches!(result, Err(AppError::StorageUnavailable(_))));
    }

    #[test]
    fn page_count_matches_ceiling_division() {
        assert_eq!(page_count(12, 5), 3);
        assert_eq!(page_count(10, 5), 2);
        assert_eq!(page_count(1, 12), 1);
        assert_eq!(page_count(0, 12), 0);
    }
}
