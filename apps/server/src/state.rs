//! Shared application state handed to every handler.

use bodega_db::Database;

use crate::media::MediaStore;

/// State cloned into each handler via axum's `State` extractor.
///
/// Both members are cheap to clone: the database wraps a pooled
/// connection handle and the media store is a path plus a base URL.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub media: MediaStore,
}
