// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON command endpoints.
//!
//! Every handler first observes the request's authentication state, so a
//! sign-in or sign-out has reloaded favorites before anything is rendered.

use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, DeviceId};
use crate::models::FilterFacets;
use crate::services::render::{ClubDetail, FavoritesMode, ListView};
use crate::services::session::{ClubSession, RemoveOutcome, ToggleOutcome};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/clubs", get(get_clubs))
        .route("/api/clubs/{club}", get(get_club_detail))
        .route("/api/filters/{checkbox}", put(put_filter))
        .route("/api/favorites", get(get_favorites))
        .route("/api/favorites/toggle", post(toggle_favorite))
        .route("/api/favorites/{club}", delete(remove_favorite))
        .route("/api/favorites/local/{club}", delete(remove_local_favorite))
}

/// Lock the device's session and bring it up to date with the request's
/// authentication state.
pub(crate) async fn open_session(
    state: &AppState,
    device: &DeviceId,
    user: CurrentUser,
) -> (OwnedMutexGuard<ClubSession>, Option<String>) {
    let mut session = state.sessions.session(&device.0).await.lock_owned().await;
    let alert = session.observe_user(&state.reconciler, user.0).await;
    (session, alert)
}

// ─── Catalog ─────────────────────────────────────────────────

/// Filtered club list with the facets that produced it.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CatalogResponse {
    pub facets: FilterFacets,
    pub view: ListView,
    pub alert: Option<String>,
}

async fn get_clubs(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceId>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<CatalogResponse>> {
    let (mut session, alert) = open_session(&state, &device, user).await;
    let view = session.render_catalog(state.club_source.as_ref()).await?;

    Ok(Json(CatalogResponse {
        facets: session.facets(),
        view,
        alert,
    }))
}

/// Overlay contents for one club.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DetailResponse {
    #[serde(flatten)]
    pub detail: ClubDetail,
    pub alert: Option<String>,
}

async fn get_club_detail(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceId>,
    Extension(user): Extension<CurrentUser>,
    Path(club): Path<String>,
) -> Result<Json<DetailResponse>> {
    let (mut session, alert) = open_session(&state, &device, user).await;
    let detail = session
        .club_detail(state.club_source.as_ref(), &club)
        .await?;
    Ok(Json(DetailResponse { detail, alert }))
}

// ─── Filters ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct FilterRequest {
    checked: bool,
}

async fn put_filter(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceId>,
    Extension(user): Extension<CurrentUser>,
    Path(checkbox): Path<String>,
    Json(body): Json<FilterRequest>,
) -> Result<Json<CatalogResponse>> {
    let (mut session, alert) = open_session(&state, &device, user).await;
    let facets = session.set_checkbox(&checkbox, body.checked)?;
    tracing::debug!(checkbox = %checkbox, checked = body.checked, "Filter changed");

    let view = session.render_catalog(state.club_source.as_ref()).await?;
    Ok(Json(CatalogResponse {
        facets,
        view,
        alert,
    }))
}

// ─── Favorites ───────────────────────────────────────────────

/// Favorites-only view.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FavoritesResponse {
    pub view: ListView,
    pub alert: Option<String>,
}

async fn get_favorites(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceId>,
    Extension(user): Extension<CurrentUser>,
) -> Json<FavoritesResponse> {
    let (session, alert) = open_session(&state, &device, user).await;
    Json(FavoritesResponse {
        view: session.render_favorites(),
        alert,
    })
}

#[derive(Deserialize, Validate)]
pub struct ToggleRequest {
    #[validate(length(min = 1, max = 200))]
    pub club: String,
}

async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceId>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<ToggleRequest>,
) -> Result<Json<ToggleOutcome>> {
    body.validate()
        .map_err(|e| AppError::BadRequest(format!("Invalid club: {}", e)))?;

    let (mut session, sync_alert) = open_session(&state, &device, user).await;
    let mut outcome = session
        .toggle_favorite(&state.reconciler, state.club_source.as_ref(), &body.club)
        .await?;
    outcome.alert = outcome.alert.or(sync_alert);
    Ok(Json(outcome))
}

async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceId>,
    Extension(user): Extension<CurrentUser>,
    Path(club): Path<String>,
) -> Result<Json<RemoveOutcome>> {
    let (mut session, sync_alert) = open_session(&state, &device, user).await;
    let mut outcome = session
        .remove_favorite(
            &state.reconciler,
            state.club_source.as_ref(),
            FavoritesMode::Embedded,
            &club,
        )
        .await?;
    outcome.alert = outcome.alert.or(sync_alert);
    Ok(Json(outcome))
}

async fn remove_local_favorite(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceId>,
    Path(club): Path<String>,
) -> Result<Json<RemoveOutcome>> {
    // The dedicated favorites page works from the local copy alone, so the
    // authentication state is not consulted.
    let mut session = state.sessions.session(&device.0).await.lock_owned().await;
    let outcome = session
        .remove_favorite(
            &state.reconciler,
            state.club_source.as_ref(),
            FavoritesMode::Standalone,
            &club,
        )
        .await?;
    Ok(Json(outcome))
}
