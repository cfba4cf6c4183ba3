//! Storage layer: remote favorites documents and device-local slots.

pub mod firestore;
pub mod local;
pub mod memory;

pub use firestore::FirestoreDb;
pub use local::{FileStorage, LocalStorage, MemoryStorage, StorageError};
pub use memory::MemoryDocumentStore;

use crate::error::AppError;
use crate::models::{FavoriteRecord, UserId};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    /// Per-user documents holding the `favorites` field (keyed by user id)
    pub const USERS: &str = "users";
}

/// One addressable favorites document per authenticated user.
///
/// `array_union` and `array_remove` compare whole records, the way the
/// document store's array primitives do.
#[async_trait]
pub trait FavoritesDocumentStore: Send + Sync {
    /// Read the user's favorites. `None` means the document does not exist.
    async fn get_favorites(&self, user: &UserId) -> Result<Option<Vec<FavoriteRecord>>, AppError>;

    /// Upsert the `favorites` field, leaving other fields of the document alone.
    async fn merge_favorites(
        &self,
        user: &UserId,
        favorites: &[FavoriteRecord],
    ) -> Result<(), AppError>;

    /// Append each record not already present (whole-record equality).
    async fn array_union(&self, user: &UserId, records: &[FavoriteRecord])
        -> Result<(), AppError>;

    /// Remove every element equal to one of the records (whole-record equality).
    async fn array_remove(
        &self,
        user: &UserId,
        records: &[FavoriteRecord],
    ) -> Result<(), AppError>;
}
