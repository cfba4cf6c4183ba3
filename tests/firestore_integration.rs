// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running.
//! Run with FIRESTORE_EMULATOR_HOST pointing at the emulator.
//!
//! The emulator provides a clean state for each test run.

use std::sync::Arc;
use tf_clubs::config::FavoriteMatch;
use tf_clubs::db::{FavoritesDocumentStore, MemoryStorage};
use tf_clubs::models::{ClubRecord, FavoriteRecord, UserId};
use tf_clubs::services::{FavoritesReconciler, LocalFavoritesStore, RemoteFavoritesStore};

mod common;
use common::test_db;

/// Generate a unique user ID for test isolation.
fn unique_user() -> UserId {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    UserId::new(format!("test-user-{}", nanos))
}

fn fav(name: &str) -> FavoriteRecord {
    FavoriteRecord::snapshot(&ClubRecord::named(name))
}

#[tokio::test]
async fn test_missing_document() {
    require_emulator!();

    let db = test_db().await;
    let user = unique_user();

    let favorites = db.get_favorites(&user).await.unwrap();
    assert!(favorites.is_none(), "Document should not exist yet");
}

#[tokio::test]
async fn test_merge_then_read() {
    require_emulator!();

    let db = test_db().await;
    let user = unique_user();

    db.merge_favorites(&user, &[fav("Chess"), fav("Robotics")])
        .await
        .unwrap();
    let favorites = db.get_favorites(&user).await.unwrap().unwrap();
    assert_eq!(favorites, vec![fav("Chess"), fav("Robotics")]);

    // A second merge replaces the field.
    db.merge_favorites(&user, &[fav("Soccer")]).await.unwrap();
    let favorites = db.get_favorites(&user).await.unwrap().unwrap();
    assert_eq!(favorites, vec![fav("Soccer")]);
}

#[tokio::test]
async fn test_array_union_and_remove() {
    require_emulator!();

    let db = test_db().await;
    let user = unique_user();

    db.array_union(&user, &[fav("Chess")]).await.unwrap();
    db.array_union(&user, &[fav("Chess")]).await.unwrap();
    assert_eq!(
        db.get_favorites(&user).await.unwrap().unwrap(),
        vec![fav("Chess")]
    );

    // Whole-record equality: a drifted copy removes nothing.
    let mut drifted = fav("Chess");
    drifted.staff = Some("Someone else".to_string());
    db.array_remove(&user, &[drifted]).await.unwrap();
    assert_eq!(db.get_favorites(&user).await.unwrap().unwrap().len(), 1);

    db.array_remove(&user, &[fav("Chess")]).await.unwrap();
    assert!(db.get_favorites(&user).await.unwrap().unwrap().is_empty());
}

#[tokio::test]
async fn test_sign_in_merge_against_firestore() {
    require_emulator!();

    let db = Arc::new(test_db().await);
    let user = unique_user();
    db.merge_favorites(&user, &[fav("Soccer")]).await.unwrap();

    let reconciler = FavoritesReconciler::new(RemoteFavoritesStore::new(
        db.clone(),
        FavoriteMatch::Key,
    ));
    let local = LocalFavoritesStore::new(Arc::new(MemoryStorage::new()));
    local.add(fav("Chess"));

    let load = reconciler.load_favorites(&local, Some(&user)).await;
    assert_eq!(load.alert, None);
    assert_eq!(load.favorites.len(), 2);

    let remote = db.get_favorites(&user).await.unwrap().unwrap();
    assert_eq!(remote.len(), 2);
}
