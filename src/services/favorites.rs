// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Favorites persistence and reconciliation.
//!
//! Two copies of a user's favorites exist:
//! - the local copy, device-scoped and always present
//! - the remote copy, one document per authenticated user
//!
//! The local copy is authoritative while signed out and is the fallback
//! whenever the remote store cannot be read. On sign-in the remote copy
//! becomes authoritative and anything favorited while signed out is merged
//! into it by `club` key, remote entries winning on collision.

use crate::config::FavoriteMatch;
use crate::db::{FavoritesDocumentStore, LocalStorage};
use crate::error::{AppError, Result, SAVE_FAVORITE_ALERT};
use crate::models::{ClubRecord, FavoriteRecord, FavoritesSet, UserId};
use std::sync::Arc;

/// Local storage slot holding the favorites array.
pub const LOCAL_FAVORITES_KEY: &str = "favorites";

/// Device-local favorites copy.
///
/// Storage failures are logged and otherwise ignored: reads yield an empty
/// set and writes become no-ops.
#[derive(Clone)]
pub struct LocalFavoritesStore {
    storage: Arc<dyn LocalStorage>,
}

impl LocalFavoritesStore {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }

    pub fn get(&self) -> FavoritesSet {
        let raw = match self.storage.get_item(LOCAL_FAVORITES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return FavoritesSet::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Error reading local favorites");
                return FavoritesSet::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Discarding unreadable local favorites");
            FavoritesSet::new()
        })
    }

    pub fn set(&self, favorites: &FavoritesSet) {
        let encoded = match serde_json::to_string(favorites) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(error = %e, "Error encoding local favorites");
                return;
            }
        };

        if let Err(e) = self.storage.set_item(LOCAL_FAVORITES_KEY, &encoded) {
            tracing::warn!(error = %e, "Error saving local favorites");
        }
    }

    /// Add a record unless its key is present; returns the new local copy.
    pub fn add(&self, record: FavoriteRecord) -> FavoritesSet {
        let mut favorites = self.get();
        if favorites.insert(record) {
            self.set(&favorites);
        }
        favorites
    }

    /// Remove by key; returns the new local copy.
    pub fn remove(&self, club: &str) -> FavoritesSet {
        let mut favorites = self.get();
        if favorites.remove(club) {
            self.set(&favorites);
        }
        favorites
    }
}

/// Remote favorites copy for authenticated users.
#[derive(Clone)]
pub struct RemoteFavoritesStore {
    documents: Arc<dyn FavoritesDocumentStore>,
    matching: FavoriteMatch,
}

impl RemoteFavoritesStore {
    pub fn new(documents: Arc<dyn FavoritesDocumentStore>, matching: FavoriteMatch) -> Self {
        Self {
            documents,
            matching,
        }
    }

    /// Read the user's copy. `None` means the user has no document yet.
    pub async fn get(&self, user: &UserId) -> Result<Option<FavoritesSet>> {
        self.documents
            .get_favorites(user)
            .await
            .map(|favorites| favorites.map(FavoritesSet::from))
            .map_err(|e| AppError::FavoritesRead(e.to_string()))
    }

    /// Upsert the favorites field with exactly this set.
    pub async fn merge(&self, user: &UserId, favorites: &FavoritesSet) -> Result<()> {
        self.documents
            .merge_favorites(user, favorites.as_slice())
            .await
            .map_err(|e| AppError::FavoritesWrite(e.to_string()))
    }

    /// Add one favorite.
    pub async fn add(&self, user: &UserId, record: &FavoriteRecord) -> Result<()> {
        match self.matching {
            FavoriteMatch::Structural => self
                .documents
                .array_union(user, std::slice::from_ref(record))
                .await
                .map_err(|e| AppError::FavoritesWrite(e.to_string())),
            FavoriteMatch::Key => {
                let mut favorites = self.read_for_write(user).await?;
                if favorites.insert(record.clone()) {
                    self.merge(user, &favorites).await?;
                }
                Ok(())
            }
        }
    }

    /// Remove one favorite. Under structural matching the record must equal
    /// the stored one field for field, otherwise nothing is removed.
    pub async fn remove(&self, user: &UserId, record: &FavoriteRecord) -> Result<()> {
        match self.matching {
            FavoriteMatch::Structural => self
                .documents
                .array_remove(user, std::slice::from_ref(record))
                .await
                .map_err(|e| AppError::FavoritesWrite(e.to_string())),
            FavoriteMatch::Key => {
                let mut favorites = self.read_for_write(user).await?;
                if favorites.remove(&record.club) {
                    self.merge(user, &favorites).await?;
                }
                Ok(())
            }
        }
    }

    /// A read that is part of a write counts as a write failure.
    async fn read_for_write(&self, user: &UserId) -> Result<FavoritesSet> {
        self.documents
            .get_favorites(user)
            .await
            .map(|favorites| favorites.map(FavoritesSet::from).unwrap_or_default())
            .map_err(|e| AppError::FavoritesWrite(e.to_string()))
    }
}

/// Result of loading favorites after an authentication change.
#[derive(Debug, Clone, PartialEq)]
pub struct FavoritesLoad {
    pub favorites: FavoritesSet,
    /// Blocking message for the user when the merged set could not be saved
    /// remotely.
    pub alert: Option<&'static str>,
}

/// Result of a successful toggle.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleResult {
    pub favorites: FavoritesSet,
    /// Membership of the toggled club afterwards.
    pub favorited: bool,
}

/// Keeps the local and remote favorites copies consistent.
#[derive(Clone)]
pub struct FavoritesReconciler {
    remote: RemoteFavoritesStore,
}

impl FavoritesReconciler {
    pub fn new(remote: RemoteFavoritesStore) -> Self {
        Self { remote }
    }

    pub fn remote(&self) -> &RemoteFavoritesStore {
        &self.remote
    }

    /// Load the favorites for the current authentication state.
    ///
    /// Signed out: the local copy as stored. Signed in: the remote copy (or
    /// nothing, if the user has no document) replaces the local copy, then
    /// whatever the local copy held before is merged in and written back to
    /// both tiers. If the remote copy cannot be read the local copy is
    /// returned unchanged.
    pub async fn load_favorites(
        &self,
        local: &LocalFavoritesStore,
        user: Option<&UserId>,
    ) -> FavoritesLoad {
        let Some(user) = user else {
            return FavoritesLoad {
                favorites: local.get(),
                alert: None,
            };
        };

        let previous = local.get();

        let authoritative = match self.remote.get(user).await {
            Ok(remote) => remote.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(user = %user, error = %e, "Error loading favorites, using local copy");
                return FavoritesLoad {
                    favorites: previous,
                    alert: None,
                };
            }
        };

        local.set(&authoritative);
        if previous.is_empty() {
            return FavoritesLoad {
                favorites: authoritative,
                alert: None,
            };
        }

        match self.write_union(local, user, &authoritative, &previous).await {
            Ok(merged) => FavoritesLoad {
                favorites: merged,
                alert: None,
            },
            Err(e) => {
                tracing::error!(user = %user, error = %e, "Error syncing favorites");
                // Keep the unsynced entries on this device for the next sync.
                let merged = authoritative.union(&previous);
                local.set(&merged);
                FavoritesLoad {
                    favorites: merged,
                    alert: Some(SAVE_FAVORITE_ALERT),
                }
            }
        }
    }

    /// Merge the local copy into the remote copy by key.
    ///
    /// No-op when signed out or when the local copy is empty. Otherwise the
    /// union (remote entries first and winning on collision) is written to
    /// the remote document and to the local copy.
    pub async fn sync_local_to_remote(
        &self,
        local: &LocalFavoritesStore,
        user: Option<&UserId>,
    ) -> Result<FavoritesSet> {
        let pending = local.get();
        let Some(user) = user else {
            return Ok(pending);
        };
        if pending.is_empty() {
            return Ok(pending);
        }

        let current = self.remote.get(user).await?.unwrap_or_default();
        self.write_union(local, user, &current, &pending).await
    }

    async fn write_union(
        &self,
        local: &LocalFavoritesStore,
        user: &UserId,
        remote: &FavoritesSet,
        pending: &FavoritesSet,
    ) -> Result<FavoritesSet> {
        let merged = remote.union(pending);
        self.remote.merge(user, &merged).await?;
        local.set(&merged);

        tracing::info!(
            user = %user,
            count = merged.len(),
            added = merged.len() - remote.len(),
            "Local favorites synced to remote"
        );
        Ok(merged)
    }

    /// Flip a club's favorite membership.
    ///
    /// Signed out, only the local copy changes. Signed in, the remote copy is
    /// written first and the local copy refreshed from it; if the remote
    /// write fails neither copy changes and `FavoritesWrite` is returned.
    pub async fn toggle_favorite(
        &self,
        local: &LocalFavoritesStore,
        club: &ClubRecord,
        user: Option<&UserId>,
    ) -> Result<ToggleResult> {
        let snapshot = FavoriteRecord::snapshot(club);
        let was_favorite = local.get().contains(&club.club);

        let Some(user) = user else {
            let favorites = if was_favorite {
                local.remove(&club.club)
            } else {
                local.add(snapshot)
            };
            return Ok(ToggleResult {
                favorited: favorites.contains(&club.club),
                favorites,
            });
        };

        if was_favorite {
            self.remote.remove(user, &snapshot).await?;
        } else {
            self.remote.add(user, &snapshot).await?;
        }

        let favorites = self
            .refresh_after_write(local, user, |favorites| {
                if was_favorite {
                    favorites.remove(&club.club);
                } else {
                    favorites.insert(snapshot.clone());
                }
            })
            .await;

        tracing::info!(
            user = %user,
            club = %club.club,
            favorited = favorites.contains(&club.club),
            "Favorite toggled"
        );

        Ok(ToggleResult {
            favorited: favorites.contains(&club.club),
            favorites,
        })
    }

    /// Remove a stored favorite through whichever tier is authoritative.
    pub async fn remove_favorite(
        &self,
        local: &LocalFavoritesStore,
        record: &FavoriteRecord,
        user: Option<&UserId>,
    ) -> Result<FavoritesSet> {
        let Some(user) = user else {
            return Ok(local.remove(&record.club));
        };

        self.remote.remove(user, record).await?;

        Ok(self
            .refresh_after_write(local, user, |favorites| {
                favorites.remove(&record.club);
            })
            .await)
    }

    /// Re-read the remote copy into the local one after a successful write.
    /// If the read fails, apply the same change to the local copy instead.
    async fn refresh_after_write<F>(
        &self,
        local: &LocalFavoritesStore,
        user: &UserId,
        apply_locally: F,
    ) -> FavoritesSet
    where
        F: FnOnce(&mut FavoritesSet),
    {
        let favorites = match self.remote.get(user).await {
            Ok(remote) => remote.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(user = %user, error = %e, "Error reloading favorites after write");
                let mut favorites = local.get();
                apply_locally(&mut favorites);
                favorites
            }
        };
        local.set(&favorites);
        favorites
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryDocumentStore, MemoryStorage};

    fn local() -> (LocalFavoritesStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (LocalFavoritesStore::new(storage.clone()), storage)
    }

    #[test]
    fn test_local_store_roundtrip() {
        let (store, _) = local();
        assert!(store.get().is_empty());

        store.add(FavoriteRecord::snapshot(&ClubRecord::named("A")));
        store.add(FavoriteRecord::snapshot(&ClubRecord::named("A")));
        assert_eq!(store.get().len(), 1);

        store.remove("A");
        assert!(store.get().is_empty());
    }

    #[test]
    fn test_local_store_failure_is_empty_and_silent() {
        let (store, storage) = local();
        store.add(FavoriteRecord::snapshot(&ClubRecord::named("A")));

        storage.set_unavailable(true);
        assert!(store.get().is_empty());
        store.set(&FavoritesSet::new());

        storage.set_unavailable(false);
        assert_eq!(store.get().len(), 1);
    }

    #[test]
    fn test_local_store_garbage_slot() {
        let (store, storage) = local();
        storage.set_item(LOCAL_FAVORITES_KEY, "{{{").unwrap();
        assert!(store.get().is_empty());
    }

    #[tokio::test]
    async fn test_remote_key_add_ignores_drifted_duplicate() {
        let documents = Arc::new(MemoryDocumentStore::new());
        let remote = RemoteFavoritesStore::new(documents.clone(), FavoriteMatch::Key);
        let user = UserId::new("u1");

        let original = FavoriteRecord::snapshot(&ClubRecord::named("A"));
        remote.add(&user, &original).await.unwrap();

        let mut drifted = original.clone();
        drifted.staff = Some("New advisor".to_string());
        remote.add(&user, &drifted).await.unwrap();
        assert_eq!(documents.document(&user).unwrap(), vec![original]);

        remote.remove(&user, &drifted).await.unwrap();
        assert!(documents.document(&user).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remote_read_error_maps_to_read_failure() {
        let documents = Arc::new(MemoryDocumentStore::new());
        documents.set_fail_reads(true);
        let remote = RemoteFavoritesStore::new(documents, FavoriteMatch::Key);

        let err = remote.get(&UserId::new("u1")).await.unwrap_err();
        assert!(matches!(err, AppError::FavoritesRead(_)));
    }
}
