//! # HTTP Routes
//!
//! Route modules per entity plus the shared multipart form reader.
//!
//! ```text
//! /categories  ── CRUD + /deleted + /{id}/products
//! /products    ── CRUD + /deleted + /{id}/category + /{id}/subtract-stock
//! /customers   ── CRUD + /deleted
//! /sales       ── create (the transaction), list, get
//! ```
//!
//! All handlers are thin: validate input, call a repository, map the
//! result. Anything smarter belongs in bodega-core or bodega-db.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;
use axum::Router;

use crate::error::ApiError;
use crate::state::AppState;

pub mod categories;
pub mod customers;
pub mod products;
pub mod sales;

/// Assembles the full API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(categories::routes())
        .merge(products::routes())
        .merge(customers::routes())
        .merge(sales::routes())
        .with_state(state)
}

// =============================================================================
// Multipart form reading
// =============================================================================

/// An image part pulled out of a multipart form.
pub(crate) struct UploadedImage {
    pub filename: String,
    pub bytes: Bytes,
}

/// Text fields plus at most one image from a multipart form.
///
/// The category and product endpoints accept multipart bodies so an image
/// can ride along with the regular fields; empty image parts (no filename
/// or no bytes) count as "no upload".
pub(crate) struct FormData {
    fields: HashMap<String, String>,
    pub image: Option<UploadedImage>,
}

impl FormData {
    /// Reads every part of the multipart body into memory.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut fields = HashMap::new();
        let mut image = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::validation(format!("invalid multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == "image" {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("invalid image upload: {e}")))?;
                if !filename.is_empty() && !bytes.is_empty() {
                    image = Some(UploadedImage { filename, bytes });
                }
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(format!("invalid field '{name}': {e}")))?;
                fields.insert(name, value);
            }
        }

        Ok(FormData { fields, image })
    }

    /// Returns a text field, if present.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    /// Returns a required text field.
    pub fn required(&self, name: &str) -> Result<String, ApiError> {
        self.text(name)
            .ok_or_else(|| ApiError::validation(format!("{name} is required")))
    }

    /// Parses an optional boolean field ("true"/"false"/"1"/"0").
    pub fn boolean(&self, name: &str) -> Result<Option<bool>, ApiError> {
        match self.fields.get(name).map(String::as_str) {
            None => Ok(None),
            Some("true") | Some("1") => Ok(Some(true)),
            Some("false") | Some("0") => Ok(Some(false)),
            Some(other) => Err(ApiError::validation(format!(
                "{name} must be a boolean, got '{other}'"
            ))),
        }
    }

    /// Parses an optional integer field.
    pub fn integer(&self, name: &str) -> Result<Option<i64>, ApiError> {
        match self.fields.get(name) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| ApiError::validation(format!("{name} must be an integer"))),
        }
    }
}

/// Stores the form's image (if any) and returns its public URL.
pub(crate) async fn store_image(
    state: &AppState,
    form: &FormData,
) -> Result<Option<String>, ApiError> {
    match &form.image {
        Some(upload) => {
            let url = state.media.store(&upload.filename, &upload.bytes).await?;
            Ok(Some(url))
        }
        None => Ok(None),
    }
}
