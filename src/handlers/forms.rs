//! Multipart form parsing for the admin upload endpoints.
//!
//! The upload endpoints accept mixed forms: plain text fields alongside
//! optional file parts. The `image` and `pdf` names are overloaded, the
//! way the storefront admin UI submits them: a part with a filename is
//! an upload, a part without one is a raw URL text field.

use axum::extract::{Multipart, multipart::Field};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{category::CategoryForm, instrument::InstrumentForm},
    storage::UploadedFile,
};

/// A multipart part that is either an uploaded file or a text value.
enum FileOrText {
    File(UploadedFile),
    Text(String),
}

/// Collect the category create/update form.
pub async fn read_category_form(mut multipart: Multipart) -> Result<CategoryForm, AppError> {
    let mut form = CategoryForm::default();

    while let Some(field) = next_field(&mut multipart).await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            "name" => form.name = Some(text(field).await?),
            "description" => form.description = Some(text(field).await?),
            "image" => match file_or_text(field).await? {
                FileOrText::File(file) => form.image_file = Some(file),
                FileOrText::Text(url) if !url.is_empty() => form.image_url = Some(url),
                FileOrText::Text(_) => {}
            },
            // Unknown fields are ignored
            _ => {}
        }
    }

    Ok(form)
}

/// Collect the instrument create/update form.
pub async fn read_instrument_form(mut multipart: Multipart) -> Result<InstrumentForm, AppError> {
    let mut form = InstrumentForm::default();

    while let Some(field) = next_field(&mut multipart).await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            "name" => form.name = Some(text(field).await?),
            "categoryId" => {
                let raw = text(field).await?;
                if !raw.is_empty() {
                    let id: Uuid = raw.parse().map_err(|_| {
                        AppError::Validation("categoryId must be a valid id".to_string())
                    })?;
                    form.category_id = Some(id);
                }
            }
            "description" => form.description = Some(text(field).await?),
            "videoUrl" => form.video_url = Some(text(field).await?),
            "inStock" => form.in_stock = Some(text(field).await? == "true"),
            "pdfRemove" => form.pdf_remove = text(field).await? == "true",
            "specifications" => {
                let raw = text(field).await?;
                if !raw.is_empty() {
                    form.specifications = Some(serde_json::from_str(&raw).map_err(|_| {
                        AppError::Validation(
                            "specifications must be a JSON array of {key, value} pairs".to_string(),
                        )
                    })?);
                }
            }
            "image" => match file_or_text(field).await? {
                FileOrText::File(file) => form.image_file = Some(file),
                FileOrText::Text(url) if !url.is_empty() => form.image_url = Some(url),
                FileOrText::Text(_) => {}
            },
            "pdf" => match file_or_text(field).await? {
                FileOrText::File(file) => form.pdf_file = Some(file),
                FileOrText::Text(url) if !url.is_empty() => form.pdf_url = Some(url),
                FileOrText::Text(_) => {}
            },
            _ => {}
        }
    }

    Ok(form)
}

async fn next_field(multipart: &mut Multipart) -> Result<Option<Field<'_>>, AppError> {
    multipart.next_field().await.map_err(|err| {
        AppError::Validation(format!("Failed to parse multipart field: {err}"))
    })
}

async fn text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|err| AppError::Validation(format!("Failed to read form field: {err}")))
}

/// Decide whether a part is an upload or a plain text value.
///
/// A part without a filename (or with zero bytes, which is what an empty
/// `<input type="file">` submits) is not an upload.
async fn file_or_text(field: Field<'_>) -> Result<FileOrText, AppError> {
    let file_name = field
        .file_name()
        .filter(|name| !name.is_empty())
        .map(str::to_owned);

    match file_name {
        Some(file_name) => {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned();
            let bytes = field.bytes().await.map_err(|err| {
                AppError::Validation(format!("Failed to read uploaded file: {err}"))
            })?;

            if bytes.is_empty() {
                return Ok(FileOrText::Text(String::new()));
            }

            Ok(FileOrText::File(UploadedFile {
                bytes: bytes.to_vec(),
                file_name,
                content_type,
            }))
        }
        None => Ok(FileOrText::Text(text(field).await?)),
    }
}
