// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-device session state and command handlers.
//!
//! A `ClubSession` owns everything one device's view depends on: its local
//! storage, the last seen user, the reconciled favorites and the loaded club
//! list. Handlers hold the session lock for the whole command, so commands
//! from one device run one at a time.

use crate::db::{FileStorage, LocalStorage, MemoryStorage};
use crate::error::{AppError, Result, REMOVE_FAVORITE_ALERT, SAVE_FAVORITE_ALERT};
use crate::models::{FacetValue, FavoritesSet, FilterFacets, UserId, CHECKBOXES};
use crate::services::catalog::{ClubCatalog, ClubSource};
use crate::services::favorites::{FavoritesReconciler, LocalFavoritesStore};
use crate::services::render::{
    ClubDetail, ClubListRenderer, FavoritesListRenderer, FavoritesMode, ListView, StarIcon,
};
use dashmap::DashMap;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Outcome of a favorite toggle as the UI should show it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ToggleOutcome {
    pub club: String,
    pub favorited: bool,
    pub icon: StarIcon,
    /// Blocking message when the change was rolled back.
    pub alert: Option<String>,
}

/// Outcome of removing a favorite from the favorites view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RemoveOutcome {
    pub view: ListView,
    pub alert: Option<String>,
}

/// One device's view state.
pub struct ClubSession {
    storage: Arc<dyn LocalStorage>,
    local: LocalFavoritesStore,
    /// `None` until the first authentication state has been observed.
    current_user: Option<Option<UserId>>,
    favorites: FavoritesSet,
    catalog: Option<ClubCatalog>,
}

impl ClubSession {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        let local = LocalFavoritesStore::new(storage.clone());
        let favorites = local.get();
        Self {
            storage,
            local,
            current_user: None,
            favorites,
            catalog: None,
        }
    }

    pub fn local(&self) -> &LocalFavoritesStore {
        &self.local
    }

    pub fn favorites(&self) -> &FavoritesSet {
        &self.favorites
    }

    pub fn current_user(&self) -> Option<&UserId> {
        self.current_user.as_ref().and_then(|u| u.as_ref())
    }

    /// Observe the authentication state of a request.
    ///
    /// On a change (including the first observation) favorites are reloaded
    /// before returning. Returns a blocking alert if the reload could not
    /// save merged favorites remotely.
    pub async fn observe_user(
        &mut self,
        reconciler: &FavoritesReconciler,
        user: Option<UserId>,
    ) -> Option<String> {
        if self.current_user.as_ref() == Some(&user) {
            return None;
        }

        tracing::info!(
            user = user.as_ref().map(|u| u.as_str()),
            "Authentication state changed, reloading favorites"
        );
        let load = reconciler.load_favorites(&self.local, user.as_ref()).await;
        self.current_user = Some(user);
        self.favorites = load.favorites;
        load.alert.map(str::to_string)
    }

    // ─── Filters ─────────────────────────────────────────────────

    /// Facets from the persisted checkbox slots. Unreadable slots count as
    /// unchecked.
    pub fn facets(&self) -> FilterFacets {
        FilterFacets::from_checkbox_states(|id| match self.storage.get_item(id) {
            Ok(value) => value.map(|v| v == "true"),
            Err(e) => {
                tracing::warn!(checkbox = id, error = %e, "Error reading filter state");
                None
            }
        })
    }

    /// Persist one checkbox and return the facets now in effect.
    pub fn set_checkbox(&self, id: &str, checked: bool) -> Result<FilterFacets> {
        if FacetValue::from_checkbox(id).is_none() {
            return Err(AppError::BadRequest(format!("Unknown filter {}", id)));
        }
        let value = if checked { "true" } else { "false" };
        if let Err(e) = self.storage.set_item(id, value) {
            tracing::warn!(checkbox = id, error = %e, "Error saving filter state");
        }
        Ok(self.facets())
    }

    /// Persist the state of every checkbox at once (a submitted filter form).
    pub fn set_all_checkboxes<F>(&self, mut checked: F) -> FilterFacets
    where
        F: FnMut(&str) -> bool,
    {
        for (id, _) in CHECKBOXES {
            let value = if checked(id) { "true" } else { "false" };
            if let Err(e) = self.storage.set_item(id, value) {
                tracing::warn!(checkbox = id, error = %e, "Error saving filter state");
            }
        }
        self.facets()
    }

    // ─── Catalog ─────────────────────────────────────────────────

    /// Fetch the club list for a new page view, replacing any previous one.
    pub async fn load_catalog(&mut self, source: &dyn ClubSource) -> Result<&ClubCatalog> {
        let catalog = ClubCatalog::load(source).await.map_err(|e| {
            tracing::error!(error = %e, "Error loading clubs");
            AppError::CatalogUnavailable(e.to_string())
        })?;
        Ok(self.catalog.insert(catalog))
    }

    /// The loaded club list, fetching it if this session has none yet.
    pub async fn catalog(&mut self, source: &dyn ClubSource) -> Result<&ClubCatalog> {
        if self.catalog.is_none() {
            self.load_catalog(source).await?;
        }
        self.catalog
            .as_ref()
            .ok_or_else(|| AppError::CatalogUnavailable("club list not loaded".to_string()))
    }

    /// Filtered catalog view for the loaded club list.
    pub async fn render_catalog(&mut self, source: &dyn ClubSource) -> Result<ListView> {
        let facets = self.facets();
        let favorites = self.favorites.clone();
        let catalog = self.catalog(source).await?;
        Ok(ClubListRenderer::render(catalog, &facets, &favorites))
    }

    /// Overlay contents for one club of the loaded list.
    pub async fn club_detail(
        &mut self,
        source: &dyn ClubSource,
        club: &str,
    ) -> Result<ClubDetail> {
        let catalog = self.catalog(source).await?;
        catalog
            .get(club)
            .map(ClubDetail::for_club)
            .ok_or_else(|| AppError::NotFound(format!("Club {} not found", club)))
    }

    // ─── Favorites ───────────────────────────────────────────────

    /// Toggle a club of the loaded list.
    ///
    /// A failed remote write is reported through `alert` with the pre-toggle
    /// state, and leaves both favorites copies unchanged.
    pub async fn toggle_favorite(
        &mut self,
        reconciler: &FavoritesReconciler,
        source: &dyn ClubSource,
        club: &str,
    ) -> Result<ToggleOutcome> {
        let record = self
            .catalog(source)
            .await?
            .get(club)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Club {} not found", club)))?;
        let was_favorite = self.favorites.contains(club);
        let user = self.current_user().cloned();

        match reconciler
            .toggle_favorite(&self.local, &record, user.as_ref())
            .await
        {
            Ok(result) => {
                self.favorites = result.favorites;
                Ok(ToggleOutcome {
                    club: record.club,
                    favorited: result.favorited,
                    icon: StarIcon::for_membership(result.favorited),
                    alert: None,
                })
            }
            Err(AppError::FavoritesWrite(e)) => {
                tracing::error!(club = %record.club, error = %e, "Error updating favorites");
                Ok(ToggleOutcome {
                    club: record.club,
                    favorited: was_favorite,
                    icon: StarIcon::for_membership(was_favorite),
                    alert: Some(SAVE_FAVORITE_ALERT.to_string()),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Favorites-only view inside the catalog page.
    pub fn render_favorites(&self) -> ListView {
        FavoritesListRenderer::new(FavoritesMode::Embedded).render(&self.favorites, None)
    }

    /// Remove a favorite from the favorites view in the given mode and
    /// return the view to show next.
    pub async fn remove_favorite(
        &mut self,
        reconciler: &FavoritesReconciler,
        source: &dyn ClubSource,
        mode: FavoritesMode,
        club: &str,
    ) -> Result<RemoveOutcome> {
        let renderer = FavoritesListRenderer::new(mode);
        let user = self.current_user().cloned();

        let alert = match renderer.remove(reconciler, &self.local, club, user.as_ref()).await {
            Ok(favorites) => {
                // Signed out, the local copy is the favorites set.
                if mode == FavoritesMode::Embedded || user.is_none() {
                    self.favorites = favorites;
                }
                None
            }
            Err(AppError::FavoritesWrite(e)) => {
                tracing::error!(club, error = %e, "Error removing favorite");
                Some(REMOVE_FAVORITE_ALERT.to_string())
            }
            Err(e) => return Err(e),
        };

        let view = match mode {
            FavoritesMode::Embedded => self.render_favorites(),
            FavoritesMode::Standalone => self.render_standalone(source).await,
        };
        Ok(RemoveOutcome { view, alert })
    }

    /// The dedicated favorites page: the local copy, with display fields
    /// refreshed from a fresh club list when it can be fetched.
    pub async fn render_standalone(&self, source: &dyn ClubSource) -> ListView {
        let catalog = match ClubCatalog::load(source).await {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                tracing::warn!(error = %e, "Error loading clubs for favorites page");
                None
            }
        };
        FavoritesListRenderer::new(FavoritesMode::Standalone)
            .render(&self.local.get(), catalog.as_ref())
    }
}

struct SessionEntry {
    session: Arc<Mutex<ClubSession>>,
    /// Milliseconds since the registry was created.
    last_seen: AtomicU64,
}

/// Sessions keyed by device identifier.
///
/// Sessions idle for longer than the configured limit are evicted by
/// `evict_idle`; their device storage outlives them.
pub struct SessionRegistry {
    sessions: DashMap<String, SessionEntry>,
    storage_dir: Option<PathBuf>,
    epoch: Instant,
}

impl SessionRegistry {
    /// Device storage lives in `storage_dir` when given, otherwise in memory.
    pub fn new(storage_dir: Option<PathBuf>) -> Self {
        Self {
            sessions: DashMap::new(),
            storage_dir,
            epoch: Instant::now(),
        }
    }

    fn now_millis(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// The session for a device, created on first use.
    pub async fn session(&self, device_id: &str) -> Arc<Mutex<ClubSession>> {
        if let Some(entry) = self.sessions.get(device_id) {
            entry.last_seen.store(self.now_millis(), AtomicOrdering::Relaxed);
            return entry.session.clone();
        }

        let storage: Arc<dyn LocalStorage> = match &self.storage_dir {
            Some(dir) => Arc::new(FileStorage::for_device(dir, device_id).await),
            None => Arc::new(MemoryStorage::new()),
        };
        let now = self.now_millis();
        let entry = self
            .sessions
            .entry(device_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(device = device_id, "Created device session");
                SessionEntry {
                    session: Arc::new(Mutex::new(ClubSession::new(storage))),
                    last_seen: AtomicU64::new(now),
                }
            });
        entry.last_seen.store(now, AtomicOrdering::Relaxed);
        entry.session.clone()
    }

    /// Drop sessions not used for `max_idle`, except ones a request still
    /// holds. Returns how many were dropped.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Duration::from_millis(self.now_millis());
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| {
            let last_seen = Duration::from_millis(entry.last_seen.load(AtomicOrdering::Relaxed));
            now.saturating_sub(last_seen) < max_idle || Arc::strong_count(&entry.session) > 1
        });
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::info!(evicted, remaining = self.sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_reused_per_device() {
        let registry = SessionRegistry::new(None);
        let first = registry.session("device-a").await;
        let again = registry.session("device-a").await;
        assert!(Arc::ptr_eq(&first, &again));

        registry.session("device-b").await;
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_evict_idle_sessions() {
        let registry = SessionRegistry::new(None);
        for n in 0..3 {
            registry.session(&format!("crawler-{}", n)).await;
        }
        let held = registry.session("browser").await;
        let _guard = held.lock().await;

        assert_eq!(registry.evict_idle(Duration::from_secs(3600)), 0);
        assert_eq!(registry.len(), 4);

        // Everything is idle at a zero limit, but a held session stays.
        assert_eq!(registry.evict_idle(Duration::ZERO), 3);
        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(&registry.session("browser").await, &held));
    }
}
