// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! TF Clubs: school club directory with per-user favorites
//!
//! This crate serves the filterable club list and keeps each visitor's
//! favorites in two tiers: a device-local copy that works without signing
//! in, and a per-user remote document that follows an authenticated user
//! between devices.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::{ClubSource, FavoritesReconciler, SessionRegistry};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub reconciler: FavoritesReconciler,
    pub club_source: Arc<dyn ClubSource>,
    pub sessions: SessionRegistry,
}
