// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Process-local favorites documents.
//!
//! Used when no Firestore project is configured and as the remote store in
//! tests, where reads and writes can be made to fail on demand.

use crate::db::FavoritesDocumentStore;
use crate::error::AppError;
use crate::models::{FavoriteRecord, UserId};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: DashMap<UserId, Vec<FavoriteRecord>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user's document directly.
    pub fn insert_document(&self, user: &UserId, favorites: Vec<FavoriteRecord>) {
        self.documents.insert(user.clone(), favorites);
    }

    /// Current contents of a user's document, bypassing failure injection.
    pub fn document(&self, user: &UserId) -> Option<Vec<FavoriteRecord>> {
        self.documents.get(user).map(|d| d.value().clone())
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_read(&self) -> Result<(), AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Database("simulated read failure".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database("simulated write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl FavoritesDocumentStore for MemoryDocumentStore {
    async fn get_favorites(&self, user: &UserId) -> Result<Option<Vec<FavoriteRecord>>, AppError> {
        self.check_read()?;
        Ok(self.document(user))
    }

    async fn merge_favorites(
        &self,
        user: &UserId,
        favorites: &[FavoriteRecord],
    ) -> Result<(), AppError> {
        self.check_write()?;
        self.documents.insert(user.clone(), favorites.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn array_union(
        &self,
        user: &UserId,
        records: &[FavoriteRecord],
    ) -> Result<(), AppError> {
        self.check_write()?;
        let mut document = self.documents.entry(user.clone()).or_default();
        for record in records {
            if !document.contains(record) {
                document.push(record.clone());
            }
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn array_remove(
        &self,
        user: &UserId,
        records: &[FavoriteRecord],
    ) -> Result<(), AppError> {
        self.check_write()?;
        let mut document = self.documents.entry(user.clone()).or_default();
        document.retain(|existing| !records.contains(existing));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClubRecord;

    fn fav(club: &str) -> FavoriteRecord {
        FavoriteRecord::snapshot(&ClubRecord::named(club))
    }

    #[tokio::test]
    async fn test_missing_document_is_none() {
        let store = MemoryDocumentStore::new();
        let user = UserId::new("u1");
        assert_eq!(store.get_favorites(&user).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_array_primitives_are_structural() {
        let store = MemoryDocumentStore::new();
        let user = UserId::new("u1");

        store.array_union(&user, &[fav("A")]).await.unwrap();
        store.array_union(&user, &[fav("A")]).await.unwrap();
        assert_eq!(store.document(&user).unwrap().len(), 1);

        let mut drifted = fav("A");
        drifted.description = "Updated description".to_string();
        store.array_remove(&user, &[drifted]).await.unwrap();
        assert_eq!(store.document(&user).unwrap(), vec![fav("A")]);

        store.array_remove(&user, &[fav("A")]).await.unwrap();
        assert!(store.document(&user).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryDocumentStore::new();
        let user = UserId::new("u1");

        store.set_fail_writes(true);
        assert!(store.merge_favorites(&user, &[fav("A")]).await.is_err());
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.document(&user), None);

        store.set_fail_reads(true);
        assert!(matches!(
            store.get_favorites(&user).await,
            Err(AppError::Database(_))
        ));
    }
}
