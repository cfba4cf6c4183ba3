// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod catalog;
pub mod favorites;
pub mod render;
pub mod session;

pub use catalog::{
    CatalogError, ClubCatalog, ClubSource, FileClubSource, HttpClubSource, StaticClubSource,
};
pub use favorites::{
    FavoritesLoad, FavoritesReconciler, LocalFavoritesStore, RemoteFavoritesStore, ToggleResult,
};
pub use render::{ClubDetail, ClubListRenderer, FavoritesListRenderer, FavoritesMode, ListView};
pub use session::{ClubSession, SessionRegistry};
