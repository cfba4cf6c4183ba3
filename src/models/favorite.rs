// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Favorite snapshots and the ordered favorites set.

use crate::models::club::{ClubRecord, ClubType, MeetingDay, MeetingTime};
use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Description stored when a club is favorited without one.
pub const DEFAULT_DESCRIPTION: &str = "No description available.";

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

/// Authenticated user identifier (the session token subject).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Copy of a club's fields taken when it was favorited.
///
/// Identity is the `club` key; the other fields are a cache that may drift
/// from the live catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FavoriteRecord {
    pub club: String,
    #[serde(default)]
    pub staff: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "Type", default)]
    pub club_type: Option<ClubType>,
    #[serde(rename = "Time", default)]
    pub time: Option<MeetingTime>,
    #[serde(rename = "Day", default)]
    pub day: Option<MeetingDay>,
    #[serde(default = "default_description")]
    pub description: String,
}

impl FavoriteRecord {
    /// Snapshot a club, substituting the placeholder for a missing or empty
    /// description.
    pub fn snapshot(club: &ClubRecord) -> Self {
        Self {
            club: club.club.clone(),
            staff: club.staff.clone(),
            email: club.email.clone(),
            club_type: club.club_type,
            time: club.time,
            day: club.day,
            description: club
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(default_description),
        }
    }

    /// View the snapshot as a club record (for detail rendering).
    pub fn to_club(&self) -> ClubRecord {
        ClubRecord {
            club: self.club.clone(),
            staff: self.staff.clone(),
            email: self.email.clone(),
            club_type: self.club_type,
            time: self.time,
            day: self.day,
            description: Some(self.description.clone()),
        }
    }
}

/// Ordered favorites keyed by `club`, with no duplicate keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<FavoriteRecord>", into = "Vec<FavoriteRecord>")]
pub struct FavoritesSet {
    records: Vec<FavoriteRecord>,
}

impl From<Vec<FavoriteRecord>> for FavoritesSet {
    /// Later duplicates of a key are dropped.
    fn from(records: Vec<FavoriteRecord>) -> Self {
        let mut set = Self::default();
        for record in records {
            set.insert(record);
        }
        set
    }
}

impl From<FavoritesSet> for Vec<FavoriteRecord> {
    fn from(set: FavoritesSet) -> Self {
        set.records
    }
}

impl FavoritesSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FavoriteRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[FavoriteRecord] {
        &self.records
    }

    pub fn contains(&self, club: &str) -> bool {
        self.records.iter().any(|r| r.club == club)
    }

    pub fn get(&self, club: &str) -> Option<&FavoriteRecord> {
        self.records.iter().find(|r| r.club == club)
    }

    /// Append a record unless its key is already present.
    ///
    /// Returns `true` if the record was added.
    pub fn insert(&mut self, record: FavoriteRecord) -> bool {
        if self.contains(&record.club) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Remove the record with this key. Returns `true` if one was removed.
    pub fn remove(&mut self, club: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.club != club);
        self.records.len() != before
    }

    /// Union by key: entries of `self` win on collision and keep their order,
    /// entries of `other` with new keys are appended in their order.
    pub fn union(&self, other: &FavoritesSet) -> FavoritesSet {
        let mut merged = self.clone();
        for record in other.iter() {
            merged.insert(record.clone());
        }
        merged
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.club.as_str())
    }
}

impl<'a> IntoIterator for &'a FavoritesSet {
    type Item = &'a FavoriteRecord;
    type IntoIter = std::slice::Iter<'a, FavoriteRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Per-user document in the remote `users` collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FavoritesDocument {
    #[serde(default)]
    pub favorites: Vec<FavoriteRecord>,
}
