//! Category data model and API request types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::storage::UploadedFile;

/// Represents a category record from the database.
///
/// # Database Table
///
/// Maps to the `categories` table. Names are unique across the
/// collection; `description` and `image` default to the empty string.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique identifier for this category
    pub id: Uuid,

    /// Display name, unique among categories
    pub name: String,

    /// Optional descriptive text (empty string when unset)
    pub description: String,

    /// Public URL of the category image, or empty
    pub image: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Multipart form payload for category create/update.
///
/// All fields are optional at the parsing layer; the service enforces
/// that `name` is present on create. `image` may arrive either as a file
/// part (uploaded to object storage) or as a plain URL text field.
#[derive(Debug, Default)]
pub struct CategoryForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub image_file: Option<UploadedFile>,
}

/// Explicit partial update for a category: only `Some` fields are
/// applied, everything else keeps its stored value.
#[derive(Debug, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl CategoryPatch {
    /// Apply the present fields onto an existing record.
    pub fn merge_into(self, target: &mut Category) {
        if let Some(name) = self.name {
            target.name = name;
        }
        if let Some(description) = self.description {
            target.description = description;
        }
        if let Some(image) = self.image {
            target.image = image;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Category {
        Category {
            id: Uuid::new_v4(),
            name: "Oscilloscopes".to_string(),
            description: "Lab scopes".to_string(),
            image: "https://example.com/scopes.png".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn merge_applies_only_present_fields() {
        let mut category = sample();
        let original_image = category.image.clone();

        CategoryPatch {
            name: Some("Power Supplies".to_string()),
            description: None,
            image: None,
        }
        .merge_into(&mut category);

        assert_eq!(category.name, "Power Supplies");
        assert_eq!(category.description, "Lab scopes");
        assert_eq!(category.image, original_image);
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut category = sample();
        let before = format!("{category:?}");
        CategoryPatch::default().merge_into(&mut category);
        assert_eq!(format!("{category:?}"), before);
    }
}
