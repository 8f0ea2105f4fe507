//! # Bodega Server
//!
//! HTTP API for the Bodega inventory/sales backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Bodega Server                                  │
//! │                                                                         │
//! │  Client ───► axum Router ───► Repositories (bodega-db) ───► SQLite    │
//! │                  │                                                      │
//! │                  └───► MediaStore ───► media bucket directory           │
//! │                          (uploads served back under /media)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod media;
mod routes;
mod state;

use axum::extract::DefaultBodyLimit;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bodega_db::{Database, DbConfig};

use crate::config::ServerConfig;
use crate::media::MediaStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env is optional; real environments set variables directly
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::load()?;
    info!(addr = %config.bind_addr, db = %config.database_path.display(), "Starting Bodega server");

    let db = Database::new(DbConfig::new(&config.database_path)).await?;

    tokio::fs::create_dir_all(&config.media_dir).await?;
    let media = MediaStore::new(&config.media_dir, &config.media_base_url);

    let state = AppState {
        db,
        media: media.clone(),
    };

    let app = routes::router(state)
        .nest_service("/media", ServeDir::new(media.root()))
        // The axum default (2 MB) would reject image uploads before the
        // tower-http limit gets a say; raise it and let tower-http enforce.
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
