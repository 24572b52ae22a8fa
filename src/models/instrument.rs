//! Instrument data model, API payloads, and row mapping.
//!
//! Instruments reference their category by id only. The reference is
//! nullable: deleting a category clears it on every dependent instrument
//! instead of cascading the delete, so reads resolve the category with a
//! LEFT JOIN and may legitimately find none.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

use crate::{error::AppError, models::category::Category, storage::UploadedFile};

/// One entry of an instrument's ordered specification list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecPair {
    pub key: String,
    pub value: String,
}

/// Represents an instrument record from the database.
///
/// # Database Table
///
/// Maps to the `instruments` table. `specifications` is stored as a
/// JSONB array of `{key, value}` pairs; media fields hold public URLs
/// and default to the empty string.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: Uuid,

    pub name: String,

    /// Reference to the owning category; NULL after that category has
    /// been deleted.
    pub category_id: Option<Uuid>,

    pub description: String,

    /// Ordered key/value specification pairs
    pub specifications: Vec<SpecPair>,

    /// Public URL of the product image, or empty
    pub image: String,

    /// External video URL, or empty
    pub video_url: String,

    /// Public URL of the datasheet PDF, or empty
    pub pdf: String,

    /// Whether the instrument is visible on the public storefront
    pub in_stock: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Instrument with its category resolved, as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentWithCategory {
    #[serde(flatten)]
    pub instrument: Instrument,

    /// The resolved category, or `null` for orphaned instruments
    pub category: Option<Category>,
}

/// Paged public listing response.
#[derive(Debug, Serialize)]
pub struct InstrumentPage {
    pub items: Vec<InstrumentWithCategory>,
    pub total: i64,
    pub page: u32,
    pub pages: i64,
}

/// Multipart form payload for instrument create/update.
///
/// Text fields and file parts are collected as-is; the service decides
/// what each combination means (see the attachment transitions in the
/// catalog service). `image` and `pdf` may each arrive as a file part or
/// as a plain URL text field under the same name.
#[derive(Debug, Default)]
pub struct InstrumentForm {
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub specifications: Option<Vec<SpecPair>>,
    pub video_url: Option<String>,
    pub in_stock: Option<bool>,
    pub image_url: Option<String>,
    pub image_file: Option<UploadedFile>,
    pub pdf_url: Option<String>,
    pub pdf_file: Option<UploadedFile>,
    pub pdf_remove: bool,
}

/// Explicit partial update for an instrument: only `Some` fields are
/// applied. `pdf` set to `Some("")` records an explicit removal.
#[derive(Debug, Default)]
pub struct InstrumentPatch {
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub specifications: Option<Vec<SpecPair>>,
    pub video_url: Option<String>,
    pub in_stock: Option<bool>,
    pub image: Option<String>,
    pub pdf: Option<String>,
}

impl InstrumentPatch {
    /// Apply the present fields onto an existing record.
    pub fn merge_into(self, target: &mut Instrument) {
        if let Some(name) = self.name {
            target.name = name;
        }
        if let Some(category_id) = self.category_id {
            target.category_id = Some(category_id);
        }
        if let Some(description) = self.description {
            target.description = description;
        }
        if let Some(specifications) = self.specifications {
            target.specifications = specifications;
        }
        if let Some(video_url) = self.video_url {
            target.video_url = video_url;
        }
        if let Some(in_stock) = self.in_stock {
            target.in_stock = in_stock;
        }
        if let Some(image) = self.image {
            target.image = image;
        }
        if let Some(pdf) = self.pdf {
            target.pdf = pdf;
        }
    }
}

/// Column list for instrument queries that resolve the category.
///
/// Category columns are aliased so [`with_category_from_row`] can pick
/// them apart; the LEFT JOIN leaves them NULL for orphaned instruments.
pub const SELECT_WITH_CATEGORY: &str = r#"
SELECT i.id, i.name, i.category_id, i.description, i.specifications,
       i.image, i.video_url, i.pdf, i.in_stock, i.created_at, i.updated_at,
       c.id AS category_row_id, c.name AS category_name,
       c.description AS category_description, c.image AS category_image,
       c.created_at AS category_created_at, c.updated_at AS category_updated_at
FROM instruments i
LEFT JOIN categories c ON c.id = i.category_id
"#;

/// Map a bare `instruments` row (no join) into an [`Instrument`].
pub fn from_row(row: &PgRow) -> Result<Instrument, AppError> {
    let specifications: serde_json::Value = row.try_get("specifications")?;

    Ok(Instrument {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        category_id: row.try_get("category_id")?,
        description: row.try_get("description")?,
        // Tolerant read: malformed stored JSON degrades to an empty list
        specifications: serde_json::from_value(specifications).unwrap_or_default(),
        image: row.try_get("image")?,
        video_url: row.try_get("video_url")?,
        pdf: row.try_get("pdf")?,
        in_stock: row.try_get("in_stock")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Map a joined row produced by [`SELECT_WITH_CATEGORY`].
pub fn with_category_from_row(row: &PgRow) -> Result<InstrumentWithCategory, AppError> {
    let instrument = from_row(row)?;

    let category = match row.try_get::<Option<Uuid>, _>("category_row_id")? {
        Some(id) => Some(Category {
            id,
            name: row.try_get("category_name")?,
            description: row.try_get("category_description")?,
            image: row.try_get("category_image")?,
            created_at: row.try_get("category_created_at")?,
            updated_at: row.try_get("category_updated_at")?,
        }),
        None => None,
    };

    Ok(InstrumentWithCategory {
        instrument,
        category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Instrument {
        Instrument {
            id: Uuid::new_v4(),
            name: "VegaScope 3000".to_string(),
            category_id: Some(Uuid::new_v4()),
            description: "300MHz oscilloscope".to_string(),
            specifications: vec![SpecPair {
                key: "Bandwidth".to_string(),
                value: "300 MHz".to_string(),
            }],
            image: "https://example.com/scope.png".to_string(),
            video_url: "https://example.com/video".to_string(),
            pdf: "https://example.com/manual.pdf".to_string(),
            in_stock: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn stock_only_patch_leaves_every_other_field_unchanged() {
        let mut instrument = sample();
        let before = instrument.clone();

        InstrumentPatch {
            in_stock: Some(false),
            ..Default::default()
        }
        .merge_into(&mut instrument);

        assert!(!instrument.in_stock);
        assert_eq!(instrument.name, before.name);
        assert_eq!(instrument.category_id, before.category_id);
        assert_eq!(instrument.description, before.description);
        assert_eq!(instrument.specifications, before.specifications);
        assert_eq!(instrument.image, before.image);
        assert_eq!(instrument.video_url, before.video_url);
        assert_eq!(instrument.pdf, before.pdf);
    }

    #[test]
    fn pdf_removal_is_recorded_as_empty_string() {
        let mut instrument = sample();

        InstrumentPatch {
            pdf: Some(String::new()),
            ..Default::default()
        }
        .merge_into(&mut instrument);

        assert_eq!(instrument.pdf, "");
    }

    #[test]
    fn serialized_form_uses_camel_case_wire_names() {
        let with_category = InstrumentWithCategory {
            instrument: sample(),
            category: None,
        };
        let json = serde_json::to_value(&with_category).expect("serializes");

        assert!(json.get("videoUrl").is_some());
        assert!(json.get("inStock").is_some());
        assert!(json.get("categoryId").is_some());
        assert!(json.get("category").is_some());
        assert!(json.get("video_url").is_none());
    }
}
