// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod club;
pub mod favorite;
pub mod filter;

pub use club::{ClubRecord, ClubType, MeetingDay, MeetingTime};
pub use favorite::{FavoriteRecord, FavoritesDocument, FavoritesSet, UserId, DEFAULT_DESCRIPTION};
pub use filter::{FacetValue, FilterFacets, CHECKBOXES};
