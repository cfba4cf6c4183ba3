// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! TF Clubs Server
//!
//! Serves the school club directory and keeps each visitor's favorites in
//! step between their device and their signed-in account.

use std::sync::Arc;
use tf_clubs::{
    config::{ClubListSource, Config, RemoteStoreKind},
    db::{FavoritesDocumentStore, FirestoreDb, MemoryDocumentStore},
    services::{
        ClubSource, FavoritesReconciler, FileClubSource, HttpClubSource, RemoteFavoritesStore,
        SessionRegistry,
    },
    AppState,
};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting TF Clubs server");

    // Remote favorites documents
    let documents: Arc<dyn FavoritesDocumentStore> = match config.remote_store {
        RemoteStoreKind::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        RemoteStoreKind::Memory => {
            tracing::warn!("Using in-memory favorites documents; they are lost on restart");
            Arc::new(MemoryDocumentStore::new())
        }
    };
    let remote = RemoteFavoritesStore::new(documents, config.favorite_match);
    tracing::info!(matching = ?config.favorite_match, "Favorites store initialized");

    // Published club list
    let club_source: Arc<dyn ClubSource> = match &config.club_source {
        ClubListSource::Url(url) => {
            tracing::info!(url = %url, "Club list served from URL");
            Arc::new(HttpClubSource::new(url.clone()))
        }
        ClubListSource::File(path) => {
            tracing::info!(path = %path.display(), "Club list served from file");
            Arc::new(FileClubSource::new(path))
        }
    };

    // Per-device sessions
    if let Some(dir) = &config.local_storage_dir {
        tokio::fs::create_dir_all(dir).await?;
        tracing::info!(dir = %dir.display(), "Device storage on disk");
    }
    let sessions = SessionRegistry::new(config.local_storage_dir.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        reconciler: FavoritesReconciler::new(remote),
        club_source,
        sessions,
    });

    // Drop idle device sessions
    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            sweeper.sessions.evict_idle(sweeper.config.session_idle);
        }
    });

    // Build router
    let app = tf_clubs::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), tracing_subscriber::filter::ParseError> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tf_clubs=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
